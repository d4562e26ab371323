//! Integration controller for reconciling Integration resources

use crate::config::OperatorConfig;
use futures::StreamExt;
use integration_api::{Integration, IntegrationStatus};
use integration_core::ingress::{ingress_rules, merge_ingress_rules, new_ingress, rules_patch};
use integration_core::{
    build_routes, ConfigRegistry, CoreError, RegistrySelection, RouteRule, WorkloadSpec,
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{finalizer, Event as Finalizer};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Finalizer guarding Integration deletion
pub const FINALIZER_NAME: &str = "integration.operator.io/ingress-finalizer";

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Finalizer error: {0}")]
    Finalizer(#[source] Box<kube_runtime::finalizer::Error<ReconcileError>>),
}

type Result<T> = std::result::Result<T, ReconcileError>;

/// State shared by every reconciliation
struct Context {
    client: Client,
    registry: Arc<ConfigRegistry>,
    config: OperatorConfig,
}

pub struct IntegrationController {
    client: Client,
    registry: Arc<ConfigRegistry>,
    config: OperatorConfig,
}

impl IntegrationController {
    pub fn new(client: Client, registry: Arc<ConfigRegistry>, config: OperatorConfig) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Starting Integration reconciliation");

        let integrations: Api<Integration> = Api::all(self.client.clone());
        let context = Arc::new(Context {
            client: self.client.clone(),
            registry: self.registry.clone(),
            config: self.config.clone(),
        });

        let mut stream = Controller::new(integrations, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .boxed();

        while let Some(item) = stream.next().await {
            match item {
                Ok((obj, _)) => debug!("Reconciled Integration {}", obj.name),
                Err(e) => error!("Error in reconciliation stream: {}", e),
            }
        }

        Ok(())
    }
}

async fn reconcile(integration: Arc<Integration>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = integration.namespace().unwrap_or_else(|| "default".to_string());
    info!("Reconciling Integration: {}/{}", namespace, integration.name_any());

    let integrations: Api<Integration> = Api::namespaced(ctx.client.clone(), &namespace);
    finalizer(&integrations, FINALIZER_NAME, integration, |event| async move {
        match event {
            Finalizer::Apply(integration) => apply(integration, &namespace, &ctx).await,
            Finalizer::Cleanup(integration) => cleanup(integration),
        }
    })
    .await
    .map_err(|e| ReconcileError::Finalizer(Box::new(e)))
}

async fn apply(integration: Arc<Integration>, namespace: &str, ctx: &Context) -> Result<Action> {
    let name = integration.name_any();
    let config = &ctx.config;

    let workload = WorkloadSpec::from(integration.as_ref());
    let candidate = build_routes(&workload);
    let route_count = candidate.paths.len() as u32;

    sync_ingress(namespace, candidate, ctx).await?;

    let selection = RegistrySelection::new(
        config.registry_type.clone(),
        config.repository.clone(),
        integration.spec.image.clone(),
    );
    let registry_config = ctx.registry.resolve(&selection)?;
    debug!(
        "Registry configuration for {}: type={} args={:?} volumes={}",
        name,
        registry_config.registry_type,
        registry_config.args,
        registry_config.volumes.len()
    );

    let status = IntegrationStatus {
        ready: true,
        ingress_host: Some(config.ingress_host.clone()),
        route_count,
        registry_type: Some(registry_config.registry_type.to_string()),
    };
    let integrations: Api<Integration> = Api::namespaced(ctx.client.clone(), namespace);
    integrations
        .patch_status(
            &name,
            &PatchParams::default(),
            &Patch::Merge(serde_json::json!({ "status": status })),
        )
        .await?;

    Ok(Action::requeue(Duration::from_secs(config.requeue_seconds)))
}

/// Merge the integration's rule into the managed Ingress, creating it if absent
async fn sync_ingress(namespace: &str, candidate: RouteRule, ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let ingresses: Api<Ingress> = Api::namespaced(ctx.client.clone(), namespace);

    match ingresses.get_opt(&config.ingress_name).await? {
        Some(existing) => {
            let (rules, present) =
                merge_ingress_rules(ingress_rules(&existing), candidate, &config.ingress_host);
            if present {
                debug!("Ingress {}/{} already up to date", namespace, config.ingress_name);
                return Ok(());
            }

            let patch = rules_patch(&rules, existing.metadata.resource_version.as_deref())?;
            ingresses
                .patch(&config.ingress_name, &PatchParams::default(), &Patch::Merge(&patch))
                .await?;
            info!(
                "Updated Ingress {}/{} with {} rules",
                namespace,
                config.ingress_name,
                rules.len()
            );
        }
        None => {
            let (rules, _) = merge_ingress_rules(Vec::new(), candidate, &config.ingress_host);
            let ingress = new_ingress(
                &config.ingress_name,
                namespace,
                config.ingress_class.as_deref(),
                rules,
            );
            ingresses.create(&PostParams::default(), &ingress).await?;
            info!("Created Ingress {}/{}", namespace, config.ingress_name);
        }
    }

    Ok(())
}

// Rules are never pruned, so a deleted integration leaves its paths in the Ingress.
fn cleanup(integration: Arc<Integration>) -> Result<Action> {
    info!(
        "Integration {} deleted; its Ingress rules are left in place",
        integration.name_any()
    );
    Ok(Action::await_change())
}

fn error_policy(integration: Arc<Integration>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    warn!("Error reconciling Integration {}: {}", integration.name_any(), err);
    Action::requeue(Duration::from_secs(60))
}
