//! Pipeline topology: source, build and the two Greengrass deploy stages

use serde_json::{json, Value};
use stack_template::{
    get_att, reference, Action, ActionCategory, ActionTypeId, Artifact, Output, Resource, Stage,
    Template,
};

use crate::errors::FleetError;
use crate::storage::params::{StackParams, TargetName, DEFAULT_PARAMS_FILE};

pub const DEFAULT_STACK_NAME: &str = "greengrass-pipeline";
pub const SERVER_APPLICATION_NAME: &str = "GreenGrassDeployment";
pub const DEPLOYMENT_GROUP_NAME: &str = "GreenGrassDeploymentGroup";
pub const BUILD_IMAGE: &str = "aws/codebuild/standard:2.0";

/// Managed policies granted to the deploy projects
pub const DEPLOY_POLICIES: [&str; 4] = [
    "AWSCloudFormationFullAccess",
    "AmazonS3FullAccess",
    "AWSGreengrassFullAccess",
    "IAMFullAccess",
];

const SOURCE_ARTIFACT: &str = "source";

/// The build image ships without a Rust toolchain
const RUSTUP_INSTALL: &str =
    "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --profile minimal";
const CARGO: &str = "$HOME/.cargo/bin/cargo";
const DEPLOYER_BINARY: &str = "./target/release/ggdeploy";

/// A CodeBuild project that runs the reconciler against one environment
#[derive(Debug, Clone)]
struct DeployProject {
    logical_id: &'static str,
    project_name: &'static str,
    target: TargetName,
    stage_name: &'static str,
    action_name: &'static str,
}

const DEPLOY_PROJECTS: [DeployProject; 2] = [
    DeployProject {
        logical_id: "Deploy",
        project_name: "canary",
        target: TargetName::Canary,
        stage_name: "Deploy_in_greengrass_canary",
        action_name: "Build_Package_Deploy_Canary",
    },
    DeployProject {
        logical_id: "DeployMain",
        project_name: "iot-gg-cicd-workshop-deploy-main",
        target: TargetName::Main,
        stage_name: "Deploy_in_greengrass_main",
        action_name: "Build_Package_Deploy_Main",
    },
];

/// The pipeline stack, validated from the parameter file
#[derive(Debug, Clone)]
pub struct PipelineStack {
    pub stack_name: String,
    pub repository_name: String,
    pub repository_branch: String,
    pub pipeline_name: String,
    pub instance_tags: Vec<(String, Vec<String>)>,
    pub region: String,
    /// Parameter file the deploy stages pass to the reconciler
    pub params_path: String,
}

impl PipelineStack {
    pub fn from_params(params: &StackParams, region: &str) -> Result<Self, FleetError> {
        let required = |value: &Option<String>, key: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| FleetError::ConfigError(format!("{} is required for the pipeline stack", key)))
        };

        Ok(Self {
            stack_name: params
                .stack_name
                .clone()
                .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string()),
            repository_name: required(&params.repository_name, "repositoryName")?,
            repository_branch: required(&params.repository_branch_name, "repositoryBranchName")?,
            pipeline_name: required(&params.pipeline_name, "pipelineName")?,
            instance_tags: params
                .on_premise_instance_tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            region: region.to_string(),
            params_path: params
                .deploy_params_path
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PARAMS_FILE.to_string()),
        })
    }

    /// Render the stack as a provisioning template
    pub fn synth(&self) -> Result<Template, FleetError> {
        let mut template = Template::new(format!(
            "Greengrass delivery pipeline {} ({})",
            self.pipeline_name, self.stack_name
        ));

        template.add_resource("ArtifactsBucket", Resource::new("AWS::S3::Bucket", json!({})))?;

        template.add_resource(
            SERVER_APPLICATION_NAME,
            Resource::new(
                "AWS::CodeDeploy::Application",
                json!({
                    "ApplicationName": SERVER_APPLICATION_NAME,
                    "ComputePlatform": "Server",
                }),
            ),
        )?;
        template.add_resource(
            "CodeDeployRole",
            service_role(
                "codedeploy.amazonaws.com",
                &["arn:aws:iam::aws:policy/service-role/AWSCodeDeployRole".to_string()],
            ),
        )?;
        template.add_resource("CodeDeploymentGroup", self.deployment_group())?;

        for project in &DEPLOY_PROJECTS {
            let role_id = format!("{}Role", project.logical_id);
            let policies: Vec<String> = DEPLOY_POLICIES
                .iter()
                .map(|p| format!("arn:aws:iam::aws:policy/{}", p))
                .collect();
            template.add_resource(&role_id, service_role("codebuild.amazonaws.com", &policies))?;
            template.add_resource(project.logical_id, self.build_project(project, &role_id))?;
        }

        template.add_resource("PipelineRole", pipeline_role())?;
        template.add_resource(
            "Pipeline",
            Resource::new(
                "AWS::CodePipeline::Pipeline",
                json!({
                    "Name": self.pipeline_name,
                    "RoleArn": get_att("PipelineRole", "Arn"),
                    "ArtifactStore": { "Type": "S3", "Location": reference("ArtifactsBucket") },
                    "Stages": self.stages(),
                }),
            )
            .depends_on("PipelineRole"),
        )?;

        template.add_output(
            "PipelineName",
            Output {
                value: reference("Pipeline"),
                description: Some("Name of the delivery pipeline".to_string()),
            },
        );
        Ok(template)
    }

    fn deployment_group(&self) -> Resource {
        let tag_group: Vec<Value> = self
            .instance_tags
            .iter()
            .flat_map(|(key, values)| {
                if values.is_empty() {
                    vec![json!({ "Key": key, "Type": "KEY_ONLY" })]
                } else {
                    values
                        .iter()
                        .map(|value| json!({ "Key": key, "Value": value, "Type": "KEY_AND_VALUE" }))
                        .collect()
                }
            })
            .collect();

        let mut properties = json!({
            "ApplicationName": reference(SERVER_APPLICATION_NAME),
            "DeploymentGroupName": DEPLOYMENT_GROUP_NAME,
            "DeploymentConfigName": "CodeDeployDefault.OneAtATime",
            "ServiceRoleArn": get_att("CodeDeployRole", "Arn"),
        });
        if !tag_group.is_empty() {
            properties["OnPremisesTagSet"] = json!({
                "OnPremisesTagSetList": [ { "OnPremisesTagGroup": tag_group } ]
            });
        }

        Resource::new("AWS::CodeDeploy::DeploymentGroup", properties)
    }

    fn build_project(&self, project: &DeployProject, role_id: &str) -> Resource {
        Resource::new(
            "AWS::CodeBuild::Project",
            json!({
                "Name": project.project_name,
                "ServiceRole": get_att(role_id, "Arn"),
                "Source": { "Type": "CODEPIPELINE", "BuildSpec": build_spec(project.target, &self.params_path).to_string() },
                "Artifacts": { "Type": "CODEPIPELINE" },
                "Environment": {
                    "Type": "LINUX_CONTAINER",
                    "ComputeType": "BUILD_GENERAL1_SMALL",
                    "Image": BUILD_IMAGE,
                    "EnvironmentVariables": [
                        { "Name": "AWS_DEFAULT_REGION", "Type": "PLAINTEXT", "Value": self.region }
                    ],
                },
            }),
        )
        .depends_on(role_id)
    }

    fn stages(&self) -> Vec<Stage> {
        let source = Artifact::named(SOURCE_ARTIFACT);

        let mut stages = vec![
            Stage {
                name: "Source".to_string(),
                actions: vec![Action {
                    name: "CodeCommit_Source".to_string(),
                    action_type_id: ActionTypeId::aws(ActionCategory::Source, "CodeCommit"),
                    configuration: json!({
                        "RepositoryName": self.repository_name,
                        "BranchName": self.repository_branch,
                        "PollForSourceChanges": false,
                    }),
                    input_artifacts: vec![],
                    output_artifacts: vec![source.clone()],
                    run_order: 1,
                }],
            },
            Stage {
                name: "Build_artifacts".to_string(),
                actions: vec![Action {
                    name: "Greengrass_build".to_string(),
                    action_type_id: ActionTypeId::aws(ActionCategory::Deploy, "CodeDeploy"),
                    configuration: json!({
                        "ApplicationName": SERVER_APPLICATION_NAME,
                        "DeploymentGroupName": DEPLOYMENT_GROUP_NAME,
                    }),
                    input_artifacts: vec![source.clone()],
                    output_artifacts: vec![],
                    run_order: 1,
                }],
            },
        ];

        for project in &DEPLOY_PROJECTS {
            stages.push(Stage {
                name: project.stage_name.to_string(),
                actions: vec![Action {
                    name: project.action_name.to_string(),
                    action_type_id: ActionTypeId::aws(ActionCategory::Build, "CodeBuild"),
                    configuration: json!({ "ProjectName": reference(project.logical_id) }),
                    input_artifacts: vec![source.clone()],
                    output_artifacts: vec![],
                    run_order: 1,
                }],
            });
        }
        stages
    }
}

/// Buildspec that builds the reconciler from the source checkout and runs
/// it against one environment
pub fn build_spec(target: TargetName, params_path: &str) -> Value {
    json!({
        "version": "0.2",
        "phases": {
            "install": {
                "commands": [RUSTUP_INSTALL]
            },
            "pre_build": {
                "commands": [format!("{} build --release -p ggdeploy", CARGO)]
            },
            "build": {
                "commands": [format!(
                    "{} deploy --target-name {} --params {}",
                    DEPLOYER_BINARY, target, params_path
                )]
            }
        },
        "artifacts": {
            "files": ["out/**/*"],
        },
    })
}

fn service_role(principal: &str, managed_policy_arns: &[String]) -> Resource {
    Resource::new(
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": principal },
                    "Action": "sts:AssumeRole",
                }],
            },
            "ManagedPolicyArns": managed_policy_arns,
        }),
    )
}

fn pipeline_role() -> Resource {
    let mut role = service_role("codepipeline.amazonaws.com", &[]);
    role.properties["Policies"] = json!([{
        "PolicyName": "PipelineAccess",
        "PolicyDocument": {
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Action": ["s3:GetObject", "s3:GetObjectVersion", "s3:PutObject", "s3:GetBucketVersioning"],
                    "Resource": [
                        get_att("ArtifactsBucket", "Arn"),
                        { "Fn::Join": ["", [get_att("ArtifactsBucket", "Arn"), "/*"]] },
                    ],
                },
                {
                    "Effect": "Allow",
                    "Action": [
                        "codecommit:GetBranch",
                        "codecommit:GetCommit",
                        "codecommit:UploadArchive",
                        "codecommit:GetUploadArchiveStatus",
                        "codecommit:CancelUploadArchive",
                    ],
                    "Resource": "*",
                },
                {
                    "Effect": "Allow",
                    "Action": ["codebuild:StartBuild", "codebuild:BatchGetBuilds"],
                    "Resource": "*",
                },
                {
                    "Effect": "Allow",
                    "Action": [
                        "codedeploy:CreateDeployment",
                        "codedeploy:GetApplication",
                        "codedeploy:GetApplicationRevision",
                        "codedeploy:GetDeployment",
                        "codedeploy:GetDeploymentConfig",
                        "codedeploy:RegisterApplicationRevision",
                    ],
                    "Resource": "*",
                },
            ],
        },
    }]);
    role
}
