//! In-memory service mocks shared by this crate's tests.

use async_trait::async_trait;
use cloudcraft_core::CloudError;
use cloudcraft_core::cloud::{FunctionService, FunctionSpec, ObjectStore, PutObject};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateBucket {
        bucket: String,
        location: Option<String>,
    },
    DeletePublicAccessBlock {
        bucket: String,
    },
    PutBucketPolicy {
        bucket: String,
        policy: String,
    },
    PutBucketWebsite {
        bucket: String,
        index_document: String,
    },
    PutObject {
        bucket: String,
        key: String,
    },
}

/// Records every call; fails all of them when built with [`MockStore::failing`].
pub struct MockStore {
    calls: Mutex<Vec<StoreCall>>,
    failure: Option<CloudError>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(error: CloudError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<(), CloudError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), CloudError> {
        self.record(StoreCall::CreateBucket {
            bucket: bucket.into(),
            location: location_constraint.map(str::to_string),
        })
    }

    async fn delete_public_access_block(&self, bucket: &str) -> Result<(), CloudError> {
        self.record(StoreCall::DeletePublicAccessBlock {
            bucket: bucket.into(),
        })
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError> {
        self.record(StoreCall::PutBucketPolicy {
            bucket: bucket.into(),
            policy: policy.into(),
        })
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        index_document: &str,
    ) -> Result<(), CloudError> {
        self.record(StoreCall::PutBucketWebsite {
            bucket: bucket.into(),
            index_document: index_document.into(),
        })
    }

    async fn put_object(&self, object: PutObject) -> Result<(), CloudError> {
        self.record(StoreCall::PutObject {
            bucket: object.bucket,
            key: object.key,
        })
    }
}

pub struct MockFunctions {
    created: Mutex<Vec<FunctionSpec>>,
    failure: Option<CloudError>,
}

impl MockFunctions {
    pub fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(error: CloudError) -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn created(&self) -> Vec<FunctionSpec> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionService for MockFunctions {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<String, CloudError> {
        self.created.lock().unwrap().push(spec.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(format!(
                "arn:aws:lambda:us-east-1:123456789012:function:{}",
                spec.name
            )),
        }
    }
}
