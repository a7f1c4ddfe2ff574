//! Built-in icon catalog.
//!
//! Shapes and fills are picked per family so that a rendered diagram stays
//! readable without any image files.

use super::IconShape;

pub(super) struct CatalogEntry {
    pub id: &'static str,
    pub shape: IconShape,
    pub fill: &'static str,
}

const fn entry(id: &'static str, shape: IconShape, fill: &'static str) -> CatalogEntry {
    CatalogEntry { id, shape, fill }
}

pub(super) const ENTRIES: &[CatalogEntry] = &[
    // azure.general
    entry("diagrams.azure.general.Resource", IconShape::Box, "#e8eef5"),
    entry("diagrams.azure.general.Resourcegroups", IconShape::Folder, "#e8eef5"),
    entry("diagrams.azure.general.Subscriptions", IconShape::Folder, "#e8eef5"),
    // azure.web
    entry("diagrams.azure.web.AppServices", IconShape::Component, "#cfe6fb"),
    entry("diagrams.azure.web.Search", IconShape::Component, "#cfe6fb"),
    entry("diagrams.azure.web.Signalr", IconShape::Component, "#cfe6fb"),
    entry("diagrams.azure.web.APIConnections", IconShape::Component, "#cfe6fb"),
    entry("diagrams.azure.web.StaticApps", IconShape::Component, "#cfe6fb"),
    // azure.compute
    entry("diagrams.azure.compute.FunctionApps", IconShape::Component, "#fde9c9"),
    entry("diagrams.azure.compute.ContainerApps", IconShape::Component, "#fde9c9"),
    entry("diagrams.azure.compute.ContainerInstances", IconShape::Component, "#fde9c9"),
    entry("diagrams.azure.compute.ContainerRegistries", IconShape::Folder, "#fde9c9"),
    entry("diagrams.azure.compute.KubernetesServices", IconShape::Hexagon, "#fde9c9"),
    entry("diagrams.azure.compute.VM", IconShape::Box, "#fde9c9"),
    entry("diagrams.azure.compute.VMScaleSet", IconShape::Box, "#fde9c9"),
    entry("diagrams.azure.compute.BatchAccounts", IconShape::Box, "#fde9c9"),
    // azure.database
    entry("diagrams.azure.database.SQLDatabases", IconShape::Cylinder, "#d7ecd4"),
    entry("diagrams.azure.database.SQLServers", IconShape::Cylinder, "#d7ecd4"),
    entry("diagrams.azure.database.CosmosDb", IconShape::Cylinder, "#d7ecd4"),
    entry("diagrams.azure.database.CacheForRedis", IconShape::Cylinder, "#d7ecd4"),
    entry("diagrams.azure.database.DatabaseForPostgresqlServers", IconShape::Cylinder, "#d7ecd4"),
    entry("diagrams.azure.database.DatabaseForMysqlServers", IconShape::Cylinder, "#d7ecd4"),
    // azure.storage
    entry("diagrams.azure.storage.BlobStorage", IconShape::Cylinder, "#e3dcf2"),
    entry("diagrams.azure.storage.StorageAccounts", IconShape::Cylinder, "#e3dcf2"),
    entry("diagrams.azure.storage.DataLakeStorage", IconShape::Cylinder, "#e3dcf2"),
    entry("diagrams.azure.storage.QueuesStorage", IconShape::Note, "#e3dcf2"),
    entry("diagrams.azure.storage.TableStorage", IconShape::Cylinder, "#e3dcf2"),
    // azure.ml
    entry("diagrams.azure.ml.AzureOpenAI", IconShape::Hexagon, "#f6d5e5"),
    entry("diagrams.azure.ml.CognitiveServices", IconShape::Hexagon, "#f6d5e5"),
    entry("diagrams.azure.ml.MachineLearningServiceWorkspaces", IconShape::Hexagon, "#f6d5e5"),
    entry("diagrams.azure.ml.BotServices", IconShape::Hexagon, "#f6d5e5"),
    // azure.security
    entry("diagrams.azure.security.KeyVaults", IconShape::Rounded, "#fbe0d0"),
    entry("diagrams.azure.security.SecurityCenter", IconShape::Rounded, "#fbe0d0"),
    entry("diagrams.azure.security.Sentinel", IconShape::Rounded, "#fbe0d0"),
    // azure.identity
    entry("diagrams.azure.identity.ManagedIdentities", IconShape::Rounded, "#fbe0d0"),
    entry("diagrams.azure.identity.ActiveDirectory", IconShape::Rounded, "#fbe0d0"),
    // azure.integration
    entry("diagrams.azure.integration.APIManagement", IconShape::Component, "#d5eef0"),
    entry("diagrams.azure.integration.ServiceBus", IconShape::Note, "#d5eef0"),
    entry("diagrams.azure.integration.EventGridTopics", IconShape::Note, "#d5eef0"),
    entry("diagrams.azure.integration.LogicApps", IconShape::Component, "#d5eef0"),
    // azure.network
    entry("diagrams.azure.network.ApplicationGateway", IconShape::Box, "#dde3ea"),
    entry("diagrams.azure.network.VirtualNetworks", IconShape::Rounded, "#dde3ea"),
    entry("diagrams.azure.network.PrivateEndpoint", IconShape::Ellipse, "#dde3ea"),
    entry("diagrams.azure.network.FrontDoors", IconShape::Box, "#dde3ea"),
    entry("diagrams.azure.network.LoadBalancers", IconShape::Box, "#dde3ea"),
    entry("diagrams.azure.network.DNSZones", IconShape::Box, "#dde3ea"),
    entry("diagrams.azure.network.Firewall", IconShape::Box, "#dde3ea"),
    // azure.analytics
    entry("diagrams.azure.analytics.EventHubs", IconShape::Note, "#f2ecc8"),
    entry("diagrams.azure.analytics.DataFactories", IconShape::Component, "#f2ecc8"),
    entry("diagrams.azure.analytics.Databricks", IconShape::Component, "#f2ecc8"),
    entry("diagrams.azure.analytics.SynapseAnalytics", IconShape::Cylinder, "#f2ecc8"),
    entry("diagrams.azure.analytics.StreamAnalyticsJobs", IconShape::Component, "#f2ecc8"),
    // azure.devops
    entry("diagrams.azure.devops.Devops", IconShape::Box, "#e0e7f7"),
    entry("diagrams.azure.devops.ApplicationInsights", IconShape::Box, "#e0e7f7"),
    // azure.iot
    entry("diagrams.azure.iot.IotHub", IconShape::Hexagon, "#e6f2d9"),
    // onprem.client
    entry("diagrams.onprem.client.User", IconShape::Person, "#ffffff"),
    entry("diagrams.onprem.client.Users", IconShape::Person, "#ffffff"),
    entry("diagrams.onprem.client.Client", IconShape::Box, "#ffffff"),
    // onprem.network
    entry("diagrams.onprem.network.Internet", IconShape::Ellipse, "#ffffff"),
    entry("diagrams.onprem.network.Nginx", IconShape::Box, "#ffffff"),
    // onprem.database
    entry("diagrams.onprem.database.PostgreSQL", IconShape::Cylinder, "#ffffff"),
    entry("diagrams.onprem.database.MySQL", IconShape::Cylinder, "#ffffff"),
    // onprem.inmemory
    entry("diagrams.onprem.inmemory.Redis", IconShape::Cylinder, "#ffffff"),
    // onprem.queue
    entry("diagrams.onprem.queue.Kafka", IconShape::Note, "#ffffff"),
    entry("diagrams.onprem.queue.RabbitMQ", IconShape::Note, "#ffffff"),
    // onprem.compute
    entry("diagrams.onprem.compute.Server", IconShape::Box, "#ffffff"),
];
