//! Service catalogue and endpoint construction.

use std::fmt;

/// Identifies one remote service: name, API group and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceSignature {
    pub name: &'static str,
    pub group: &'static str,
    pub version: &'static str,
}

impl ServiceSignature {
    /// `{server}/api/adwords/{group}/{version}/{name}`
    pub fn endpoint(&self, server: &str) -> String {
        format!(
            "{}/api/adwords/{}/{}/{}",
            server.trim_end_matches('/'),
            self.group,
            self.version,
            self.name
        )
    }
}

impl fmt::Display for ServiceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.version, self.name)
    }
}

pub const BULK_MUTATE_JOB_SERVICE: ServiceSignature = ServiceSignature {
    name: "BulkMutateJobService",
    group: "job",
    version: "v201008",
};

pub const DATA_SERVICE: ServiceSignature = ServiceSignature {
    name: "DataService",
    group: "cm",
    version: "v201506",
};

pub const AD_GROUP_SERVICE: ServiceSignature = ServiceSignature {
    name: "AdGroupService",
    group: "cm",
    version: "v201101",
};

pub const AD_GROUP_CRITERION_SERVICE: ServiceSignature = ServiceSignature {
    name: "AdGroupCriterionService",
    group: "cm",
    version: "v201101",
};

/// Every service this client speaks
pub const ALL_SERVICES: &[ServiceSignature] = &[
    BULK_MUTATE_JOB_SERVICE,
    DATA_SERVICE,
    AD_GROUP_SERVICE,
    AD_GROUP_CRITERION_SERVICE,
];

/// Look up a service by name
pub fn find_service(name: &str) -> Option<&'static ServiceSignature> {
    ALL_SERVICES.iter().find(|s| s.name == name)
}
