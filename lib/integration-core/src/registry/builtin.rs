//! Built-in registry strategies
//!
//! Every strategy pushes through the image builder's `--destination`
//! argument and mounts the credentials that registry needs.

use super::{ConfigRegistry, RegistryConfig, RegistryType};
use k8s_openapi::api::core::v1::{KeyToPath, SecretVolumeSource, Volume, VolumeMount};
use tracing::warn;

pub const DOCKER_HUB: RegistryType = RegistryType::from_static("DOCKER_HUB");
pub const AMAZON_ECR: RegistryType = RegistryType::from_static("AMAZON_ECR");
pub const GCR: RegistryType = RegistryType::from_static("GCR");
pub const QUAY: RegistryType = RegistryType::from_static("QUAY");
pub const HTTP: RegistryType = RegistryType::from_static("HTTP");
pub const HTTPS: RegistryType = RegistryType::from_static("HTTPS");

const VOLUME_DOCKER_CONFIG: &str = "docker-config";
const VOLUME_AWS_CREDENTIALS: &str = "aws-credentials";
const VOLUME_GCR_CREDENTIALS: &str = "gcr-credentials";

const PATH_DOCKER_CONFIG: &str = "/kaniko/.docker";
const PATH_AWS_CREDENTIALS: &str = "/root/.aws";
const PATH_GCR_CREDENTIALS: &str = "/secret";

const SECRET_DOCKER_CONFIG: &str = "docker-registry-credentials";
const SECRET_ECR_DOCKER_CONFIG: &str = "ecr-docker-config";
const SECRET_AWS_CREDENTIALS: &str = "aws-credentials";
const SECRET_GCR_CREDENTIALS: &str = "gcr-service-account";

/// Register every built-in strategy into `registry`
pub fn register_all(registry: &mut ConfigRegistry) {
    let strategies: [(RegistryType, fn(&str, &str) -> RegistryConfig); 6] = [
        (DOCKER_HUB, docker_hub),
        (AMAZON_ECR, amazon_ecr),
        (GCR, gcr),
        (QUAY, quay),
        (HTTP, http),
        (HTTPS, https),
    ];

    for (registry_type, factory) in strategies {
        if let Err(e) = registry.register(registry_type, factory) {
            warn!("Skipping built-in registry strategy: {}", e);
        }
    }
}

/// Docker Hub; `repository` is the account or organization
pub fn docker_hub(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: DOCKER_HUB,
        args: vec![destination(&format!("docker.io/{}", repository), image)],
        volume_mounts: vec![mount(VOLUME_DOCKER_CONFIG, PATH_DOCKER_CONFIG)],
        volumes: vec![docker_config_volume(SECRET_DOCKER_CONFIG)],
    }
}

/// Amazon ECR; `repository` is the full registry URI
pub fn amazon_ecr(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: AMAZON_ECR,
        args: vec![destination(repository, image)],
        volume_mounts: vec![
            mount(VOLUME_DOCKER_CONFIG, PATH_DOCKER_CONFIG),
            mount(VOLUME_AWS_CREDENTIALS, PATH_AWS_CREDENTIALS),
        ],
        volumes: vec![
            docker_config_volume(SECRET_ECR_DOCKER_CONFIG),
            secret_volume(VOLUME_AWS_CREDENTIALS, SECRET_AWS_CREDENTIALS, None),
        ],
    }
}

/// Google Container Registry; `repository` is the GCP project
pub fn gcr(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: GCR,
        args: vec![destination(&format!("gcr.io/{}", repository), image)],
        volume_mounts: vec![mount(VOLUME_GCR_CREDENTIALS, PATH_GCR_CREDENTIALS)],
        volumes: vec![secret_volume(VOLUME_GCR_CREDENTIALS, SECRET_GCR_CREDENTIALS, None)],
    }
}

/// Quay.io; `repository` is the account or organization
pub fn quay(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: QUAY,
        args: vec![destination(&format!("quay.io/{}", repository), image)],
        volume_mounts: vec![mount(VOLUME_DOCKER_CONFIG, PATH_DOCKER_CONFIG)],
        volumes: vec![docker_config_volume(SECRET_DOCKER_CONFIG)],
    }
}

/// Private registry served over plain HTTP; `repository` is `host[:port][/path]`
pub fn http(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: HTTP,
        args: vec![
            destination(repository, image),
            "--insecure".to_string(),
            "--skip-tls-verify".to_string(),
        ],
        volume_mounts: vec![mount(VOLUME_DOCKER_CONFIG, PATH_DOCKER_CONFIG)],
        volumes: vec![docker_config_volume(SECRET_DOCKER_CONFIG)],
    }
}

/// Private registry served over HTTPS; `repository` is `host[:port][/path]`
pub fn https(repository: &str, image: &str) -> RegistryConfig {
    RegistryConfig {
        registry_type: HTTPS,
        args: vec![destination(repository, image)],
        volume_mounts: vec![mount(VOLUME_DOCKER_CONFIG, PATH_DOCKER_CONFIG)],
        volumes: vec![docker_config_volume(SECRET_DOCKER_CONFIG)],
    }
}

fn destination(repository: &str, image: &str) -> String {
    let repository = repository.trim_end_matches('/');
    if repository.is_empty() {
        format!("--destination={}", image)
    } else {
        format!("--destination={}/{}", repository, image)
    }
}

fn mount(name: &str, path: &str) -> VolumeMount {
    VolumeMount {
        name: name.to_string(),
        mount_path: path.to_string(),
        read_only: Some(true),
        ..Default::default()
    }
}

// Docker credential secrets hold `.dockerconfigjson`; the builder expects `config.json`.
fn docker_config_volume(secret: &str) -> Volume {
    secret_volume(
        VOLUME_DOCKER_CONFIG,
        secret,
        Some(vec![KeyToPath {
            key: ".dockerconfigjson".to_string(),
            path: "config.json".to_string(),
            mode: None,
        }]),
    )
}

fn secret_volume(name: &str, secret: &str, items: Option<Vec<KeyToPath>>) -> Volume {
    Volume {
        name: name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret.to_string()),
            items,
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistrySelection;

    #[test]
    fn test_defaults_register_all_types() {
        let registry = ConfigRegistry::with_defaults();
        assert_eq!(registry.registered_types().len(), 6);
        for ty in [DOCKER_HUB, AMAZON_ECR, GCR, QUAY, HTTP, HTTPS] {
            assert!(registry.contains(&ty), "missing {}", ty);
        }
    }

    #[test]
    fn test_registering_defaults_twice_keeps_first() {
        let mut registry = ConfigRegistry::with_defaults();
        register_all(&mut registry);
        assert_eq!(registry.registered_types().len(), 6);
    }

    #[test]
    fn test_docker_hub() {
        let config = docker_hub("acme", "orders:1.0");
        assert_eq!(config.registry_type, DOCKER_HUB);
        assert_eq!(config.args, vec!["--destination=docker.io/acme/orders:1.0"]);
        assert_eq!(config.volume_mounts[0].mount_path, PATH_DOCKER_CONFIG);

        let secret = config.volumes[0].secret.as_ref().unwrap();
        assert_eq!(secret.secret_name.as_deref(), Some(SECRET_DOCKER_CONFIG));
        assert_eq!(secret.items.as_ref().unwrap()[0].path, "config.json");
    }

    #[test]
    fn test_amazon_ecr_mounts_aws_credentials() {
        let config = amazon_ecr("123456789012.dkr.ecr.us-east-1.amazonaws.com/", "orders");
        assert_eq!(
            config.args,
            vec!["--destination=123456789012.dkr.ecr.us-east-1.amazonaws.com/orders"]
        );
        let paths: Vec<&str> = config.volume_mounts.iter().map(|m| m.mount_path.as_str()).collect();
        assert_eq!(paths, vec![PATH_DOCKER_CONFIG, PATH_AWS_CREDENTIALS]);
        assert_eq!(config.volumes.len(), 2);
    }

    #[test]
    fn test_gcr() {
        let config = gcr("my-project", "orders");
        assert_eq!(config.args, vec!["--destination=gcr.io/my-project/orders"]);
        assert_eq!(config.volumes[0].name, VOLUME_GCR_CREDENTIALS);
    }

    #[test]
    fn test_http_is_insecure() {
        let config = http("registry.local:5000", "orders");
        assert_eq!(config.args[0], "--destination=registry.local:5000/orders");
        assert!(config.args.contains(&"--insecure".to_string()));
        assert!(!https("registry.local", "orders").args.contains(&"--insecure".to_string()));
    }

    #[test]
    fn test_empty_repository() {
        assert_eq!(https("", "orders").args, vec!["--destination=orders"]);
    }

    #[test]
    fn test_mounts_match_volumes() {
        let registry = ConfigRegistry::with_defaults();
        for ty in registry.registered_types() {
            let config = registry
                .resolve(&RegistrySelection::new(ty.clone(), "repo", "image"))
                .unwrap();
            assert_eq!(config.registry_type, ty);
            for mount in &config.volume_mounts {
                assert!(
                    config.volumes.iter().any(|v| v.name == mount.name),
                    "{}: mount {} has no volume",
                    ty,
                    mount.name
                );
            }
        }
    }
}
