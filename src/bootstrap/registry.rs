//! Service Registry
//!
//! The fixed set of service identifiers a client handle can be bound to.
//! Every service is one row in [`SERVICES`]; adding a service means adding
//! a row, nothing else.

/// Broad grouping of a service, used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCategory {
    ObjectStorage,
    Messaging,
    Compute,
    Networking,
    Identity,
    Data,
    Management,
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceCategory::ObjectStorage => write!(f, "object-storage"),
            ServiceCategory::Messaging => write!(f, "messaging"),
            ServiceCategory::Compute => write!(f, "compute"),
            ServiceCategory::Networking => write!(f, "networking"),
            ServiceCategory::Identity => write!(f, "identity"),
            ServiceCategory::Data => write!(f, "data"),
            ServiceCategory::Management => write!(f, "management"),
        }
    }
}

/// One supported service.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    /// Lookup key, always lowercase (e.g. `s3`)
    pub id: &'static str,
    /// Human readable name
    pub display_name: &'static str,
    pub category: ServiceCategory,
}

impl std::fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id)
    }
}

const fn service(
    id: &'static str,
    display_name: &'static str,
    category: ServiceCategory,
) -> ServiceDescriptor {
    ServiceDescriptor {
        id,
        display_name,
        category,
    }
}

use ServiceCategory::*;

pub static SERVICES: &[ServiceDescriptor] = &[
    // Object storage
    service("s3", "Amazon S3", ObjectStorage),
    service("s3control", "Amazon S3 Control", ObjectStorage),
    service("glacier", "Amazon S3 Glacier", ObjectStorage),
    service("efs", "Amazon Elastic File System", ObjectStorage),
    service("fsx", "Amazon FSx", ObjectStorage),
    service("backup", "AWS Backup", ObjectStorage),
    // Messaging
    service("sqs", "Amazon Simple Queue Service", Messaging),
    service("sns", "Amazon Simple Notification Service", Messaging),
    service("eventbridge", "Amazon EventBridge", Messaging),
    service("kinesis", "Amazon Kinesis Data Streams", Messaging),
    service("firehose", "Amazon Data Firehose", Messaging),
    service("kafka", "Amazon Managed Streaming for Apache Kafka", Messaging),
    service("mq", "Amazon MQ", Messaging),
    service("sesv2", "Amazon Simple Email Service", Messaging),
    service("pinpoint", "Amazon Pinpoint", Messaging),
    // Compute
    service("ec2", "Amazon EC2", Compute),
    service("ecs", "Amazon Elastic Container Service", Compute),
    service("eks", "Amazon Elastic Kubernetes Service", Compute),
    service("ecr", "Amazon Elastic Container Registry", Compute),
    service("lambda", "AWS Lambda", Compute),
    service("batch", "AWS Batch", Compute),
    service("lightsail", "Amazon Lightsail", Compute),
    service("autoscaling", "Amazon EC2 Auto Scaling", Compute),
    service("elasticbeanstalk", "AWS Elastic Beanstalk", Compute),
    service("sfn", "AWS Step Functions", Compute),
    service("sagemaker", "Amazon SageMaker", Compute),
    // Networking
    service("elasticloadbalancingv2", "Elastic Load Balancing", Networking),
    service("route53", "Amazon Route 53", Networking),
    service("cloudfront", "Amazon CloudFront", Networking),
    service("apigateway", "Amazon API Gateway", Networking),
    service("apigatewayv2", "Amazon API Gateway V2", Networking),
    service("directconnect", "AWS Direct Connect", Networking),
    service("globalaccelerator", "AWS Global Accelerator", Networking),
    service("networkfirewall", "AWS Network Firewall", Networking),
    // Identity
    service("iam", "AWS Identity and Access Management", Identity),
    service("sts", "AWS Security Token Service", Identity),
    service("sso", "AWS IAM Identity Center", Identity),
    service("ssooidc", "AWS SSO OIDC", Identity),
    service("identitystore", "AWS Identity Store", Identity),
    service("cognitoidentity", "Amazon Cognito Identity", Identity),
    service("cognitoidentityprovider", "Amazon Cognito User Pools", Identity),
    service("kms", "AWS Key Management Service", Identity),
    service("secretsmanager", "AWS Secrets Manager", Identity),
    service("acm", "AWS Certificate Manager", Identity),
    service("organizations", "AWS Organizations", Identity),
    // Data
    service("dynamodb", "Amazon DynamoDB", Data),
    service("rds", "Amazon Relational Database Service", Data),
    service("elasticache", "Amazon ElastiCache", Data),
    // Management
    service("cloudwatch", "Amazon CloudWatch", Management),
    service("cloudwatchlogs", "Amazon CloudWatch Logs", Management),
    service("ssm", "AWS Systems Manager", Management),
    service("cloudformation", "AWS CloudFormation", Management),
];

/// Look up a service by id, ignoring surrounding whitespace and ASCII case.
pub fn lookup(name: &str) -> Option<&'static ServiceDescriptor> {
    find(SERVICES, name)
}

/// Same as [`lookup`], over an arbitrary table.
pub fn find(
    table: &'static [ServiceDescriptor],
    name: &str,
) -> Option<&'static ServiceDescriptor> {
    let name = name.trim();
    table.iter().find(|s| s.id.eq_ignore_ascii_case(name))
}

/// All services in a category, in table order.
pub fn by_category(category: ServiceCategory) -> impl Iterator<Item = &'static ServiceDescriptor> {
    SERVICES.iter().filter(move |s| s.category == category)
}
