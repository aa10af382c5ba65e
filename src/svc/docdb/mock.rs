//! # Mock module
//!
//! This module provides an in-memory [`Api`] implementation with a fixed page
//! order, it records every input it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::svc::docdb::{
    Api, AvailabilityZone, EngineVersion, EngineVersionsInput, Error, OrderableOption,
    OrderableOptionsInput, Page,
};

// -----------------------------------------------------------------------------
// helpers

pub fn option(class: &str) -> OrderableOption {
    OrderableOption {
        db_instance_class: class.to_string(),
        engine: "docdb".to_string(),
        engine_version: "4.0.0".to_string(),
        license_model: "na".to_string(),
        vpc: Some(true),
        availability_zones: vec![
            AvailabilityZone {
                name: "us-west-2a".to_string(),
            },
            AvailabilityZone {
                name: "us-west-2b".to_string(),
            },
        ],
    }
}

// -----------------------------------------------------------------------------
// Mock structure

#[derive(Debug, Default)]
pub struct Mock {
    pub engine_versions: Vec<EngineVersion>,
    pub pages: Vec<Vec<Option<OrderableOption>>>,
    pub failure: bool,
    pub engine_versions_inputs: Mutex<Vec<EngineVersionsInput>>,
    pub orderable_options_inputs: Mutex<Vec<(OrderableOptionsInput, Option<String>)>>,
}

impl Mock {
    pub fn with_options(options: Vec<OrderableOption>) -> Self {
        Self::with_pages(vec![options.into_iter().map(Some).collect()])
    }

    pub fn with_pages(pages: Vec<Vec<Option<OrderableOption>>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failure: true,
            ..Default::default()
        }
    }

    pub fn orderable_options_inputs(&self) -> Vec<(OrderableOptionsInput, Option<String>)> {
        self.orderable_options_inputs
            .lock()
            .expect("lock to not be poisoned")
            .to_owned()
    }

    pub fn engine_versions_inputs(&self) -> Vec<EngineVersionsInput> {
        self.engine_versions_inputs
            .lock()
            .expect("lock to not be poisoned")
            .to_owned()
    }
}

#[async_trait]
impl Api for Mock {
    async fn describe_db_engine_versions(
        &self,
        input: &EngineVersionsInput,
    ) -> Result<Vec<EngineVersion>, Error> {
        self.engine_versions_inputs
            .lock()
            .expect("lock to not be poisoned")
            .push(input.to_owned());

        if self.failure {
            return Err(Error::DescribeDbEngineVersions("connection reset".into()));
        }

        Ok(self.engine_versions.to_owned())
    }

    async fn describe_orderable_db_instance_options(
        &self,
        input: &OrderableOptionsInput,
        marker: Option<String>,
    ) -> Result<Page, Error> {
        self.orderable_options_inputs
            .lock()
            .expect("lock to not be poisoned")
            .push((input.to_owned(), marker.to_owned()));

        if self.failure {
            return Err(Error::DescribeOrderableDbInstanceOptions(
                "connection reset".into(),
            ));
        }

        // markers are the index of the page to return
        let index = match marker {
            Some(marker) => marker
                .parse::<usize>()
                .map_err(|err| Error::DescribeOrderableDbInstanceOptions(err.into()))?,
            None => 0,
        };

        let options = match self.pages.get(index) {
            Some(options) => options.to_owned(),
            None if index == 0 => vec![],
            None => {
                return Err(Error::DescribeOrderableDbInstanceOptions(
                    format!("no such page '{}'", index).into(),
                ))
            }
        };

        let marker = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };

        Ok(Page { options, marker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> OrderableOptionsInput {
        OrderableOptionsInput {
            db_instance_class: None,
            engine: "docdb".to_string(),
            engine_version: None,
            license_model: "na".to_string(),
            vpc: None,
        }
    }

    #[tokio::test]
    async fn test_pages_stop_after_the_last_page() {
        let mock = Mock::with_pages(vec![
            vec![Some(option("db.r5.large"))],
            vec![None],
            vec![Some(option("db.r5.xlarge"))],
        ]);

        let mut flags = vec![];
        mock.describe_orderable_db_instance_options_pages(&input(), |_, last_page| {
            flags.push(last_page);
            !last_page
        })
        .await
        .unwrap();

        assert_eq!(vec![false, false, true], flags);
        assert_eq!(3, mock.orderable_options_inputs().len());
    }

    #[tokio::test]
    async fn test_pages_never_fetch_past_the_last_page() {
        let mock = Mock::with_options(vec![option("db.r5.large")]);

        let mut calls = 0;
        mock.describe_orderable_db_instance_options_pages(&input(), |_, _| {
            calls += 1;
            true
        })
        .await
        .unwrap();

        assert_eq!(1, calls);
        assert_eq!(1, mock.orderable_options_inputs().len());
    }

    #[tokio::test]
    async fn test_pages_stop_when_the_callback_asks_to() {
        let mock = Mock::with_pages(vec![
            vec![Some(option("db.r5.large"))],
            vec![Some(option("db.r5.xlarge"))],
        ]);

        mock.describe_orderable_db_instance_options_pages(&input(), |_, _| false)
            .await
            .unwrap();

        assert_eq!(1, mock.orderable_options_inputs().len());
    }

    #[tokio::test]
    async fn test_pages_forward_markers() {
        let mock = Mock::with_pages(vec![vec![], vec![], vec![]]);

        mock.describe_orderable_db_instance_options_pages(&input(), |_, last_page| !last_page)
            .await
            .unwrap();

        let markers: Vec<_> = mock
            .orderable_options_inputs()
            .into_iter()
            .map(|(_, marker)| marker)
            .collect();

        assert_eq!(
            vec![None, Some("1".to_string()), Some("2".to_string())],
            markers
        );
    }
}
