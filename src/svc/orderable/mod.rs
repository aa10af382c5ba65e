//! # Orderable module
//!
//! This module resolves a single orderable DocumentDB instance configuration
//! from the filters given by the caller. The resolution normalizes the filters
//! into a [`QueryPlan`], resolves the default engine version when asked to,
//! walks every page of the orderable options listing and finally selects one
//! option.

use tracing::{debug, info};

use crate::svc::docdb::{self, Api, EngineVersionsInput, OrderableOption};

pub mod filter;
pub mod output;
pub mod selector;

pub use filter::{Filters, QueryPlan};
pub use output::OrderableDbInstance;
pub use selector::select;

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error reading DocumentDB default engine version, {0}")]
    DefaultEngineVersion(docdb::Error),
    #[error("error reading DocumentDB orderable instance options, {0}")]
    OrderableOptions(docdb::Error),
    #[error("no DocumentDB default engine version found for engine '{0}'")]
    NoDefaultEngineVersion(String),
    #[error("no DocumentDB orderable instance options found matching criteria; try a different search")]
    NotFound,
    #[error("multiple DocumentDB instance classes ({}) match the criteria; try a different search", candidates(.0))]
    Ambiguous(Vec<OrderableOption>),
    #[error("conflicting arguments '{0}' and '{1}', only one of them could be set")]
    Conflict(&'static str, &'static str),
}

fn candidates(options: &[OrderableOption]) -> String {
    options
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// -----------------------------------------------------------------------------
// helpers

/// retrieves the default engine version of the planned engine and writes it
/// into the plan
#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn resolve_default_version<A>(api: &A, plan: &mut QueryPlan) -> Result<(), Error>
where
    A: Api,
{
    let input = EngineVersionsInput {
        engine: plan.input.engine.to_owned(),
        default_only: true,
    };

    let versions = api
        .describe_db_engine_versions(&input)
        .await
        .map_err(Error::DefaultEngineVersion)?;

    let version = versions
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoDefaultEngineVersion(input.engine.to_owned()))?;

    debug!(
        engine = &input.engine,
        engine_version = &version.engine_version,
        "Resolve default engine version"
    );

    plan.input.engine_version = Some(version.engine_version);
    Ok(())
}

/// returns every orderable option matching the plan in arrival order
#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn enumerate<A>(api: &A, plan: &QueryPlan) -> Result<Vec<OrderableOption>, Error>
where
    A: Api,
{
    let mut options = vec![];

    api.describe_orderable_db_instance_options_pages(&plan.input, |page, last_page| {
        options.extend(page.into_iter().flatten());
        !last_page
    })
    .await
    .map_err(Error::OrderableOptions)?;

    debug!(
        options = options.len(),
        "Retrieve orderable instance options"
    );

    Ok(options)
}

/// resolves the orderable instance matching the filters
#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn read<A>(api: &A, filters: &Filters) -> Result<OrderableDbInstance, Error>
where
    A: Api,
{
    let mut plan = QueryPlan::from(filters);
    if plan.default_only {
        resolve_default_version(api, &mut plan).await?;
    }

    debug!(
        engine = &plan.input.engine,
        engine_version = plan.input.engine_version.as_deref().unwrap_or("<none>"),
        instance_class = plan.input.db_instance_class.as_deref().unwrap_or("<none>"),
        license_model = &plan.input.license_model,
        vpc = plan.input.vpc,
        "Read DocumentDB orderable instance options"
    );

    let options = enumerate(api, &plan).await?;
    let option = select(options, &plan.preferred_instance_classes)?;

    info!(
        instance_class = &option.db_instance_class,
        engine = &option.engine,
        engine_version = &option.engine_version,
        "Select DocumentDB orderable instance"
    );

    Ok(OrderableDbInstance::bind(filters, option))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svc::docdb::{
        mock::{option, Mock},
        EngineVersion,
    };

    fn version(engine_version: &str) -> EngineVersion {
        EngineVersion {
            engine: "docdb".to_string(),
            engine_version: engine_version.to_string(),
        }
    }

    #[tokio::test]
    async fn test_single_exact_match() {
        let mock = Mock::with_options(vec![option("db.r5.large")]);
        let filters = Filters {
            instance_class: Some("db.r5.large".to_string()),
            engine: Some("docdb".to_string()),
            ..Default::default()
        };

        let instance = read(&mock, &filters).await.unwrap();

        assert_eq!("db.r5.large", instance.id);
        assert_eq!("db.r5.large", instance.instance_class);
        assert_eq!("docdb", instance.engine);
        assert_eq!("4.0.0", instance.engine_version);
        assert_eq!("na", instance.license_model);
        assert_eq!(Some(true), instance.vpc);
        assert_eq!(vec!["us-west-2a", "us-west-2b"], instance.availability_zones);

        let inputs = mock.orderable_options_inputs();
        assert_eq!(1, inputs.len());
        assert_eq!(Some("db.r5.large"), inputs[0].0.db_instance_class.as_deref());
        assert!(mock.engine_versions_inputs().is_empty());
    }

    #[tokio::test]
    async fn test_preference_priority() {
        let mock = Mock::with_options(vec![option("db.r5.large"), option("db.r5.xlarge")]);
        let filters = Filters {
            preferred_instance_classes: vec!["db.r5.xlarge".to_string(), "db.r5.large".to_string()],
            ..Default::default()
        };

        let instance = read(&mock, &filters).await.unwrap();

        assert_eq!("db.r5.xlarge", instance.instance_class);
        assert_eq!(None, mock.orderable_options_inputs()[0].0.db_instance_class);
    }

    #[tokio::test]
    async fn test_preference_miss_falls_through() {
        let mock = Mock::with_options(vec![option("db.r5.large")]);
        let filters = Filters {
            preferred_instance_classes: vec!["db.nonexistent".to_string()],
            ..Default::default()
        };

        let instance = read(&mock, &filters).await.unwrap();

        assert_eq!("db.r5.large", instance.instance_class);
    }

    #[tokio::test]
    async fn test_ambiguous_without_preference() {
        let mock = Mock::with_options(vec![option("db.r5.large"), option("db.r5.xlarge")]);

        let err = read(&mock, &Filters::default()).await.unwrap_err();

        assert!(matches!(err, Error::Ambiguous(_)));
        let message = err.to_string();
        assert!(message.contains("db.r5.large"));
        assert!(message.contains("db.r5.xlarge"));
    }

    #[tokio::test]
    async fn test_default_version_composition() {
        let mut mock = Mock::with_options(vec![option("db.r5.large")]);
        mock.engine_versions = vec![version("4.0.0"), version("5.0.0")];

        let filters = Filters {
            default_only: Some(true),
            ..Default::default()
        };

        let instance = read(&mock, &filters).await.unwrap();

        assert_eq!(
            vec![EngineVersionsInput {
                engine: "docdb".to_string(),
                default_only: true,
            }],
            mock.engine_versions_inputs()
        );
        assert_eq!(
            Some("4.0.0"),
            mock.orderable_options_inputs()[0].0.engine_version.as_deref()
        );
        assert_eq!("4.0.0", instance.engine_version);
        assert!(instance.default_only);
    }

    #[tokio::test]
    async fn test_default_version_uses_the_given_engine() {
        let mut mock = Mock::with_options(vec![option("db.r5.large")]);
        mock.engine_versions = vec![version("5.0.0")];

        let filters = Filters {
            engine: Some("docdb-elastic".to_string()),
            default_only: Some(true),
            ..Default::default()
        };

        read(&mock, &filters).await.unwrap();

        assert_eq!("docdb-elastic", mock.engine_versions_inputs()[0].engine);
        assert_eq!(
            Some("5.0.0"),
            mock.orderable_options_inputs()[0].0.engine_version.as_deref()
        );
    }

    #[tokio::test]
    async fn test_missing_default_version() {
        let mock = Mock::with_options(vec![option("db.r5.large")]);
        let filters = Filters {
            default_only: Some(true),
            ..Default::default()
        };

        let err = read(&mock, &filters).await.unwrap_err();

        assert!(matches!(err, Error::NoDefaultEngineVersion(ref engine) if engine == "docdb"));
        assert!(mock.orderable_options_inputs().is_empty());
    }

    #[tokio::test]
    async fn test_no_matches() {
        let mock = Mock::with_options(vec![]);
        let filters = Filters {
            engine: Some("docdb".to_string()),
            engine_version: Some("99.0.0".to_string()),
            ..Default::default()
        };

        let err = read(&mock, &filters).await.unwrap_err();

        assert!(matches!(err, Error::NotFound));
        assert_eq!(
            Some("99.0.0"),
            mock.orderable_options_inputs()[0].0.engine_version.as_deref()
        );
    }

    #[tokio::test]
    async fn test_upstream_failures_are_prefixed() {
        let mock = Mock::failing();

        let err = read(&mock, &Filters::default()).await.unwrap_err();
        assert!(matches!(err, Error::OrderableOptions(_)));
        assert!(err
            .to_string()
            .starts_with("error reading DocumentDB orderable instance options"));

        let filters = Filters {
            default_only: Some(true),
            ..Default::default()
        };

        let err = read(&mock, &filters).await.unwrap_err();
        assert!(matches!(err, Error::DefaultEngineVersion(_)));
        assert!(err
            .to_string()
            .starts_with("error reading DocumentDB default engine version"));
    }

    #[tokio::test]
    async fn test_enumerate_skips_null_entries_across_pages() {
        let mock = Mock::with_pages(vec![
            vec![None, Some(option("db.r5.large")), None],
            vec![None],
            vec![Some(option("db.r5.xlarge")), None, Some(option("db.r5.2xlarge"))],
        ]);

        let options = enumerate(&mock, &QueryPlan::from(&Filters::default()))
            .await
            .unwrap();

        let classes: Vec<_> = options
            .iter()
            .map(|option| option.db_instance_class.as_str())
            .collect();

        assert_eq!(vec!["db.r5.large", "db.r5.xlarge", "db.r5.2xlarge"], classes);
        assert_eq!(3, mock.orderable_options_inputs().len());
    }

    #[tokio::test]
    async fn test_preference_found_on_a_later_page() {
        let mock = Mock::with_pages(vec![
            vec![Some(option("db.r5.large"))],
            vec![Some(option("db.r5.xlarge"))],
        ]);
        let filters = Filters {
            preferred_instance_classes: vec!["db.r5.xlarge".to_string()],
            ..Default::default()
        };

        let instance = read(&mock, &filters).await.unwrap();

        assert_eq!("db.r5.xlarge", instance.id);
    }
}
