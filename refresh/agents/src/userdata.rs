/*!

Boot configuration for refreshed node groups. The AMI family is read from the name of the SSM
parameter that tracks the latest EKS optimized AMI, and each family gets its own document:
a `nodeadm` `NodeConfig` for Amazon Linux 2023 and a MIME multi-part `bootstrap.sh` script for
Amazon Linux 2.

!*/

use crate::clusters::ClusterSummary;
use crate::constants::{AL2023_PARAMETER_MARKER, AL2_PARAMETER_MARKER};
use crate::error::{self, Result};
use snafu::ensure;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFamily {
    AmazonLinux2023,
    AmazonLinux2,
}

impl ImageFamily {
    /// Determines the family from a parameter name such as
    /// `/aws/service/eks/optimized-ami/1.29/amazon-linux-2023/x86_64/standard/recommended/image_id`.
    /// The 2023 marker is checked first because it contains the Amazon Linux 2 marker.
    pub fn from_parameter_name(parameter_name: &str) -> Result<Self> {
        if parameter_name.contains(AL2023_PARAMETER_MARKER) {
            return Ok(Self::AmazonLinux2023);
        }
        ensure!(
            parameter_name.contains(AL2_PARAMETER_MARKER),
            error::UnsupportedImageFamilySnafu { parameter_name }
        );
        Ok(Self::AmazonLinux2)
    }

    /// The boot document for a node in `cluster`.
    pub fn boot_document(&self, cluster: &ClusterSummary) -> String {
        match self {
            Self::AmazonLinux2023 => node_config(cluster),
            Self::AmazonLinux2 => bootstrap_script(cluster),
        }
    }

    /// The boot document, base64 encoded for use as launch template user data.
    pub fn user_data(&self, cluster: &ClusterSummary) -> String {
        base64::encode(self.boot_document(cluster))
    }
}

fn node_config(cluster: &ClusterSummary) -> String {
    format!(
        r#"---
apiVersion: node.eks.aws/v1alpha1
kind: NodeConfig
spec:
  cluster:
    name: {}
    apiServerEndpoint: {}
    certificateAuthority: {}
    cidr: {}"#,
        cluster.name, cluster.endpoint, cluster.certificate_authority, cluster.service_cidr,
    )
}

fn bootstrap_script(cluster: &ClusterSummary) -> String {
    format!(
        r#"MIME-Version: 1.0
Content-Type: multipart/mixed; boundary="==MYBOUNDARY=="

--==MYBOUNDARY==
Content-Type: text/x-shellscript; charset="us-ascii"

#!/bin/bash
set -ex
/etc/eks/bootstrap.sh {} \
    --b64-cluster-ca {} \
    --apiserver-endpoint {} \
    --dns-cluster-ip {} \
    --container-runtime containerd

--==MYBOUNDARY==--"#,
        cluster.name, cluster.certificate_authority, cluster.endpoint, cluster.dns_ip,
    )
}
