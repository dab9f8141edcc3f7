//! Canonicalized provider identity
//!
//! Provider IDs are free-form strings stamped onto both Machines (by the
//! provisioner) and Nodes (by the cloud provider's kubelet integration),
//! e.g. `aws:///us-east-1a/i-0123456789`, `docker://machine-1`. They are the
//! sole join key between the two, so parsing is strict: a string that does
//! not split cleanly is a permanent error, never treated as "no match".

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Separator between the provider scheme and the resource portion
const SEPARATOR: &str = "://";

/// A provider identity split into its scheme and resource components.
///
/// Equality is exact and case-sensitive on both components - no
/// normalization is applied beyond the split itself. Two IDs from different
/// providers never compare equal even if the resource portion collides.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderId {
    scheme: String,
    resource_id: String,
}

impl ProviderId {
    /// Parse a raw provider ID string.
    ///
    /// The string is split on the first `://`. Both the scheme before it and
    /// the resource after it must be non-empty; anything after the separator
    /// (including further slashes) is kept verbatim as the resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProviderId`] if the string is empty, has no
    /// separator, or yields an empty scheme or resource component.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.is_empty() {
            return Err(Error::invalid_provider_id("provider ID is empty"));
        }

        let (scheme, resource_id) = raw.split_once(SEPARATOR).ok_or_else(|| {
            Error::invalid_provider_id(format!(
                "provider ID {:?} must be of the form <scheme>://<resource>",
                raw
            ))
        })?;

        if scheme.is_empty() {
            return Err(Error::invalid_provider_id(format!(
                "provider ID {:?} has an empty scheme",
                raw
            )));
        }
        if resource_id.is_empty() {
            return Err(Error::invalid_provider_id(format!(
                "provider ID {:?} has an empty resource component",
                raw
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            resource_id: resource_id.to_string(),
        })
    }

    /// The provider scheme, e.g. `aws` or `docker`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The resource portion after the separator, kept verbatim
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scheme, SEPARATOR, self.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_cloud_ids() {
        let cases = [
            ("aws:///us-east-1a/i-0123456789", "aws", "/us-east-1a/i-0123456789"),
            ("docker://machine-1", "docker", "machine-1"),
            ("docker:////machine-1", "docker", "//machine-1"),
            ("azure:///subscriptions/1234/vm-0", "azure", "/subscriptions/1234/vm-0"),
            // only the first separator splits
            ("gce://proj://weird", "gce", "proj://weird"),
        ];

        for (raw, scheme, resource) in cases {
            let id = ProviderId::parse(raw).unwrap_or_else(|e| panic!("{raw}: {e}"));
            assert_eq!(id.scheme(), scheme, "scheme of {raw}");
            assert_eq!(id.resource_id(), resource, "resource of {raw}");
        }
    }

    #[test]
    fn rejects_structurally_invalid_ids() {
        let cases = [
            "",
            "no-scheme-here",
            "aws:/one-slash/i-0123",
            "://missing-scheme",
            "aws://",
            ":///",
        ];

        for raw in cases {
            let err = ProviderId::parse(raw).expect_err(raw);
            assert!(
                matches!(err, Error::InvalidProviderId { .. }),
                "{raw} should be InvalidProviderId, got {err:?}"
            );
        }
    }

    #[test]
    fn equality_requires_both_components() {
        let a = ProviderId::parse("docker://x").unwrap();
        let b = ProviderId::parse("docker://x").unwrap();
        let c = ProviderId::parse("docker://y").unwrap();
        let d = ProviderId::parse("aws://x").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn equality_is_case_sensitive() {
        let lower = ProviderId::parse("docker://machine-1").unwrap();
        let upper = ProviderId::parse("Docker://machine-1").unwrap();
        let shouty = ProviderId::parse("docker://MACHINE-1").unwrap();

        assert_ne!(lower, upper);
        assert_ne!(lower, shouty);
    }

    #[test]
    fn display_round_trips_the_canonical_form() {
        let id = ProviderId::parse("aws:///us-east-1a/i-0123").unwrap();
        assert_eq!(id.to_string(), "aws:///us-east-1a/i-0123");
        assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
    }
}
