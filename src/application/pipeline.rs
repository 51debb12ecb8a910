//! Composition pipeline
//!
//! Everything up to (not including) touching the target project:
//!
//! 1. Load and validate `ruleforge.toml`
//! 2. Resolve every source into a snapshot (remote ones in parallel)
//! 3. Resolve profile selectors against the manifests
//! 4. Load shared and profile content per snapshot
//! 5. Compose the staging tree
//! 6. Hand it to the generator for the output tree
//!
//! Every failure here is fatal and happens before the first write.

use chrono::{DateTime, Utc};

use crate::config::{load_project, ValidatedConfig};
use crate::domain::entities::{OutputTree, SourceSnapshot};
use crate::domain::ports::{GenerateRequest, Generator, SourceFetcher};
use crate::domain::services::{compose, resolve_profiles, Composition, ProfileResolution};
use crate::error::{RuleforgeError, RuleforgeResult, Warning};
use crate::infrastructure::generator_for;
use crate::infrastructure::sources::{load_source, SourceResolver};

use super::context::RunContext;

/// Config plus resolved snapshots, shared by every command that reads sources
#[derive(Debug)]
pub struct ResolvedProject {
    pub config: ValidatedConfig,
    pub snapshots: Vec<SourceSnapshot>,
    pub warnings: Vec<Warning>,
}

/// What the pipeline produced, kept around for reporting
#[derive(Debug)]
pub struct PipelineOutput {
    pub snapshots: Vec<SourceSnapshot>,
    pub resolution: ProfileResolution,
    pub composition: Composition,
    pub output: OutputTree,
    /// Config, resolution and composition warnings, in that order
    pub warnings: Vec<Warning>,
}

pub struct Pipeline<F> {
    fetcher: F,
    generator: Option<Box<dyn Generator>>,
}

impl<F: SourceFetcher> Pipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            generator: None,
        }
    }

    /// Use this generator instead of the configured one
    pub fn with_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Steps 1 and 2
    pub fn resolve(&self, ctx: &RunContext, now: DateTime<Utc>) -> RuleforgeResult<ResolvedProject> {
        let (config, mut warnings) = load_project(ctx.project_root(), &ctx.overrides)?;
        ctx.interrupt.check()?;

        let refresh = ctx.refresh.unwrap_or(config.fetch.refresh);
        let resolver = SourceResolver::new(ctx.project_root(), &ctx.cache_dir, &self.fetcher)
            .with_refresh(refresh, config.fetch.stale_after_hours);
        let resolved = resolver.resolve(&config.sources, now)?;
        warnings.extend(resolved.warnings);
        ctx.interrupt.check()?;

        Ok(ResolvedProject {
            config,
            snapshots: resolved.snapshots,
            warnings,
        })
    }

    /// The whole pipeline
    pub fn run(&self, ctx: &RunContext, now: DateTime<Utc>) -> RuleforgeResult<PipelineOutput> {
        let ResolvedProject {
            config,
            snapshots,
            mut warnings,
        } = self.resolve(ctx, now)?;

        let manifests: Vec<_> = snapshots.iter().map(|s| s.manifest()).collect();
        let resolution = resolve_profiles(&config.selectors, &manifests)?;
        log::info!(
            "profiles: {}",
            resolution
                .sequence
                .iter()
                .map(|p| format!("{}/{}", snapshots[p.snapshot].name(), p))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut loaded = Vec::with_capacity(snapshots.len());
        for (idx, snapshot) in snapshots.iter().enumerate() {
            let (source, source_warnings) = load_source(snapshot, resolution.for_snapshot(idx))?;
            warnings.extend(source_warnings);
            loaded.push(source);
        }
        ctx.interrupt.check()?;

        let composition = compose(&loaded, &resolution.active_set(), config.on_malformed);
        log::info!(
            "staged {} entities ({} filtered by tags)",
            composition.tree.len(),
            composition.filtered.len()
        );
        warnings.extend(composition.warnings.iter().cloned());

        let request = GenerateRequest {
            staging: &composition.tree,
            targets: &config.targets,
            features: &config.features,
            options: &config.options,
        };
        let configured;
        let generator: &dyn Generator = match &self.generator {
            Some(generator) => generator.as_ref(),
            None => {
                configured = generator_for(config.generator_command.as_deref());
                configured.as_ref()
            }
        };
        let output = generator
            .generate(&request)
            .map_err(|e| RuleforgeError::GenerationFailure {
                message: e.to_string(),
            })?;
        log::info!("generated {} files", output.len());
        ctx.interrupt.check()?;

        Ok(PipelineOutput {
            snapshots,
            resolution,
            composition,
            output,
            warnings,
        })
    }
}
