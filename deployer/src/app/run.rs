//! Deployment and synthesis runs

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use tracing::info;

use crate::app::options::{DeployOptions, SynthOptions};
use crate::deploy::api::FleetApi;
use crate::deploy::builder::{build_config, DesiredComponents};
use crate::deploy::submit::{snapshot_deployment, submit_deployment};
use crate::errors::FleetError;
use crate::filesys::file::File;
use crate::models::report::{FailureReport, Outcome};
use crate::stack::pipeline::PipelineStack;
use crate::storage::params::ParamsFile;
use crate::workers::poller;

/// Reconcile the selected environment: build, submit, snapshot, poll, report.
///
/// Device failures and timeouts are returned in the report, not as errors.
/// The report is written to the layout's failures file before returning.
pub async fn deploy<S, F>(
    api: &dyn FleetApi,
    options: &DeployOptions,
    sleep_fn: S,
) -> Result<FailureReport, FleetError>
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    // Everything local is resolved before the first service call
    let params_file = ParamsFile::new(&options.params_file);
    let params = params_file.load().await?;
    let group = params.deployment_group(options.target)?.clone();
    let desired = DesiredComponents::prepare(&params, &params_file.base_dir()).await?;

    info!(
        "Deploying to {} ({}) as {}",
        options.target, group.target_arn, group.deployment_name
    );

    let config = build_config(api, &group, &desired).await?;
    let deployment_id = submit_deployment(api, &config).await?;
    snapshot_deployment(api, &deployment_id, &options.layout.status_file()).await?;

    let poll_options = options.poll_overrides.apply(params.polling);
    let report = poller::run(&poll_options, api, &group.target_arn, sleep_fn).await?;

    let failures_file = options.layout.failures_file();
    failures_file.write_json(&report).await?;
    info!("Failure report written to {}", failures_file.path().display());

    Ok(report)
}

/// Print the final outcome. Returns true on full success.
pub fn report_outcome(report: &FailureReport) -> bool {
    let outcome = report.outcome();
    let message = outcome.to_string();
    match outcome {
        Outcome::Success => println!("{}", message.green()),
        Outcome::Failed(_) => eprintln!("{}", message.red()),
        Outcome::TimedOut(_) => eprintln!("{}", message.yellow()),
    }
    report.is_empty()
}

/// Render the pipeline stack template and write it to the output directory
pub async fn synth(options: &SynthOptions) -> Result<PathBuf, FleetError> {
    let params = ParamsFile::new(&options.params_file).load().await?;
    let stack = PipelineStack::from_params(&params.stack, &options.region)?;
    let template = stack.synth()?;

    let file = File::new(
        options
            .out_dir
            .join(format!("{}.template.json", stack.stack_name)),
    );
    file.write_json(&template).await?;
    info!(
        "Synthesized stack {} with {} resources to {}",
        stack.stack_name,
        template.resources.len(),
        file.path().display()
    );
    Ok(file.path().to_path_buf())
}
