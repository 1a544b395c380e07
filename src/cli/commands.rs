//! `kustodian generate` and `kustodian validate`

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::ConfigLoader;
use crate::generator::{GenerateOptions, Generator, GeneratorSettings};
use crate::hooks::HookDispatcher;
use crate::loader;
use crate::models::{Cluster, NodeProfile, Project, Template};
use crate::output;
use crate::plugins::PluginRegistry;
use crate::validation::validate_all;

/// Files a cluster is compiled from
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Cluster definition file
    #[arg(long)]
    pub cluster: PathBuf,

    /// Template catalog directory
    #[arg(long)]
    pub templates: PathBuf,

    /// Project definition file supplying shared defaults
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Directory of node profiles
    #[arg(long)]
    pub profiles: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output directory
    #[arg(long, short = 'o', default_value = "output")]
    pub output: PathBuf,

    /// Generate without validating first
    #[arg(long)]
    pub skip_validation: bool,
}

struct Inputs {
    cluster: Cluster,
    templates: Vec<Template>,
    project: Option<Project>,
    profiles: BTreeMap<String, NodeProfile>,
}

fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    Ok(Inputs {
        cluster: loader::load_cluster(&args.cluster)?,
        templates: loader::load_templates(&args.templates)?,
        project: args
            .project
            .as_deref()
            .map(loader::load_project)
            .transpose()?,
        profiles: match &args.profiles {
            Some(dir) => loader::load_profiles(dir)?,
            None => BTreeMap::new(),
        },
    })
}

/// Compile a cluster and write its resources
pub async fn handle_generate(args: GenerateArgs) -> Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    let inputs = load_inputs(&args.inputs)?;

    let generator = Generator::new(
        GeneratorSettings::from_config(&config),
        HookDispatcher::new(),
        PluginRegistry::new(),
    );
    let options = GenerateOptions {
        output_dir: args.output,
        skip_validation: args.skip_validation,
        project: inputs.project,
        profiles: inputs.profiles,
    };

    let (result, plugin_resources) = generator
        .generate_with_plugins(&inputs.cluster, &inputs.templates, &options)
        .await?;
    let written = output::write_generation_result(&result)?;
    let plugin_files = output::write_plugin_resources(&result.output_dir, &plugin_resources)?;

    println!(
        "Generated {} Flux Kustomization(s) for cluster {} ({} file(s) in {})",
        result.kustomizations.len(),
        result.cluster,
        written.len() + plugin_files.len(),
        result.output_dir.display()
    );
    Ok(())
}

/// Validate a cluster and print every error found
pub async fn handle_validate(args: InputArgs) -> Result<()> {
    let inputs = load_inputs(&args)?;
    let errors = validate_all(&inputs.cluster, &inputs.templates, &inputs.profiles);

    if errors.is_empty() {
        println!("Cluster {} is valid", inputs.cluster.name());
        return Ok(());
    }

    eprintln!(
        "Cluster {} has {} validation error(s):",
        inputs.cluster.name(),
        errors.len()
    );
    for error in &errors {
        eprintln!("  - {}", error);
    }
    std::process::exit(1);
}
