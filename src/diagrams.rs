//! The four architecture diagrams of the GUIDER system and their tab metadata.
//!
//! Node and edge tables are static; positions are filled in by
//! [`crate::resolve`] when a diagram is activated.

use once_cell::sync::Lazy;

use crate::ir::{
    CanvasOptions, Diagram, Edge, EdgeKind, EdgeStyle, LayoutMode, LayoutOptions, Marker, Node,
    NodeStyle, Position, Side, Size,
};

pub const DEFAULT_TAB: &str = "overview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramTab {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const DIAGRAM_TABS: [DiagramTab; 4] = [
    DiagramTab {
        id: "overview",
        name: "System Overview",
        description: "GUIDER distributed microservices architecture",
    },
    DiagramTab {
        id: "message-flow",
        name: "Message Flow",
        description: "Service interactions and data flow",
    },
    DiagramTab {
        id: "correlation",
        name: "Correlation ID Flow",
        description: "Distributed tracing architecture",
    },
    DiagramTab {
        id: "kubernetes",
        name: "Kubernetes Infrastructure",
        description: "Deployment architecture",
    },
];

static CATALOG: Lazy<Vec<Diagram>> = Lazy::new(|| {
    vec![
        system_overview(),
        message_flow(),
        correlation_flow(),
        kubernetes_infra(),
    ]
});

pub fn catalog() -> &'static [Diagram] {
    &CATALOG
}

/// Looks up a diagram by tab id.
pub fn find(tab_id: &str) -> Option<&'static Diagram> {
    catalog().iter().find(|diagram| diagram.id == tab_id)
}

/// Same as [`find`], but unknown tab ids select the overview.
pub fn find_or_default(tab_id: &str) -> &'static Diagram {
    find(tab_id)
        .or_else(|| find(DEFAULT_TAB))
        .unwrap_or(&catalog()[0])
}

const BLUE: &str = "#3b82f6";
const GREEN: &str = "#10b981";
const AMBER: &str = "#f59e0b";
const VIOLET: &str = "#8b5cf6";
const GRAY: &str = "#6b7280";
const PINK: &str = "#ec4899";
const RED: &str = "#ef4444";
const SKY: &str = "#0ea5e9";

fn node(id: &str, label: &str, background: &str, width: f32, padding: f32, font_size: f32) -> Node {
    Node {
        id: id.to_string(),
        label: label.to_string(),
        style: NodeStyle {
            background: background.to_string(),
            color: "white".to_string(),
            padding,
            border_radius: 8.0,
            width,
            font_size,
            font_family: None,
            bold: false,
        },
        position: Position::default(),
        source_side: None,
        target_side: None,
    }
}

fn placed(mut node: Node, x: f32, y: f32) -> Node {
    node.position = Position::new(x, y);
    node
}

#[derive(Clone, Copy)]
enum Line {
    Solid,
    Dashed,
}

fn flow(
    id: &str,
    source: &str,
    target: &str,
    label: Option<&str>,
    color: &str,
    line: Line,
    animated: bool,
) -> Edge {
    let mut edge = Edge::new(id, source, target);
    edge.label = label.map(str::to_string);
    edge.kind = EdgeKind::SmoothStep;
    edge.animated = animated;
    edge.style = EdgeStyle {
        stroke: color.to_string(),
        stroke_width: 2.0,
        dasharray: match line {
            Line::Solid => None,
            Line::Dashed => Some("5,5".to_string()),
        },
    };
    edge.marker_end = Some(Marker {
        color: Some(color.to_string()),
    });
    edge
}

fn trace(id: &str, source: &str, target: &str, label: Option<&str>) -> Edge {
    let mut edge = Edge::new(id, source, target);
    edge.label = label.map(str::to_string);
    edge.animated = true;
    edge.marker_end = Some(Marker { color: None });
    edge
}

fn auto(node_size: Size, node_separation: f32, rank_separation: f32) -> LayoutMode {
    LayoutMode::Auto(LayoutOptions {
        node_size,
        node_separation,
        rank_separation,
        margin_x: 80.0,
        margin_y: 80.0,
    })
}

fn canvas(height: f32, minimap: bool) -> CanvasOptions {
    CanvasOptions {
        height,
        minimap,
        ..CanvasOptions::default()
    }
}

fn tab_text(id: &str) -> (String, String) {
    DIAGRAM_TABS
        .iter()
        .find(|tab| tab.id == id)
        .map(|tab| (tab.name.to_string(), tab.description.to_string()))
        .unwrap_or_default()
}

fn system_overview() -> Diagram {
    use Line::*;
    let w = 200.0;
    let nodes = vec![
        node("forecast", "📊 Forecast\nHTTP API", BLUE, w, 18.0, 13.0),
        node("heartbeat", "💓 Heartbeat\nScheduler", GREEN, w, 18.0, 13.0),
        node("survey", "🔍 Survey\nMetadata", GREEN, w, 18.0, 13.0),
        node("seed", "🌱 Seed\nFile Discovery", GREEN, w, 18.0, 13.0),
        node("harvest", "🌾 Harvest\nFile Download", GREEN, w, 18.0, 13.0),
        node("nexus", "🔄 Nexus\nRabbitMQ", AMBER, w, 18.0, 13.0),
        node("zephyr", "🗄️ Zephyr\nPostgreSQL + PostGIS", VIOLET, w, 18.0, 13.0),
        node("metoc", "🌐 METOC Server\nWeather Data API", GRAY, w, 18.0, 13.0),
    ];
    let mut harvest_zephyr = flow(
        "e-harvest-zephyr",
        "harvest",
        "zephyr",
        Some("Write rasters"),
        GREEN,
        Solid,
        true,
    );
    harvest_zephyr.source_handle = Some("right".to_string());
    harvest_zephyr.target_handle = Some("right".to_string());
    let edges = vec![
        flow("e-forecast-zephyr", "forecast", "zephyr", Some("Read"), BLUE, Solid, true),
        flow("e-heartbeat-nexus", "heartbeat", "nexus", Some("Publish every 6h"), GREEN, Solid, true),
        flow("e-nexus-survey", "nexus", "survey", Some("Consume heartbeat"), AMBER, Solid, true),
        flow("e-nexus-seed", "nexus", "seed", Some("Consume heartbeat"), AMBER, Solid, true),
        flow("e-nexus-harvest", "nexus", "harvest", Some("Consume file metadata"), AMBER, Solid, true),
        flow("e-survey-metoc", "survey", "metoc", Some("Query metadata"), GREEN, Dashed, false),
        flow("e-survey-zephyr", "survey", "zephyr", Some("Write metadata"), GREEN, Solid, true),
        flow("e-zephyr-seed", "zephyr", "seed", Some("Read availability"), VIOLET, Dashed, false),
        flow("e-seed-metoc", "seed", "metoc", Some("Query files"), GREEN, Dashed, false),
        flow("e-seed-nexus", "seed", "nexus", Some("Publish file metadata"), GREEN, Solid, true),
        flow("e-harvest-metoc", "harvest", "metoc", Some("Download rasters"), GREEN, Dashed, false),
        harvest_zephyr,
    ];
    let (title, description) = tab_text("overview");
    Diagram {
        id: "overview".to_string(),
        layout_name: "systemOverview".to_string(),
        title,
        description,
        nodes,
        edges,
        layout: auto(Size::new(w, 100.0), 250.0, 300.0),
        canvas: canvas(900.0, false),
    }
}

fn message_flow() -> Diagram {
    use Line::*;
    let w = 220.0;
    let mut harvest = node("harvest", "🌾 Harvest Service\n(Download + Store)", GREEN, w, 15.0, 13.0);
    harvest.source_side = Some(Side::Right);
    harvest.target_side = Some(Side::Right);
    let nodes = vec![
        node("http-client", "🌐 External API Call", BLUE, w, 15.0, 13.0),
        node("scheduled-heartbeat", "⏰ Scheduled Heartbeat\nEvery 6h", PINK, w, 15.0, 13.0),
        node("forecast", "📊 Forecast Service\n(HTTP)", BLUE, w, 15.0, 13.0),
        node("heartbeat", "💓 Heartbeat Service", GREEN, w, 15.0, 13.0),
        node("zephyr", "🗄️ Zephyr\nPostgreSQL + PostGIS\n(metadata + rasters)", VIOLET, w, 15.0, 13.0),
        node("rabbitmq", "🔄 RabbitMQ Nexus\n(3 queues)", AMBER, w, 15.0, 13.0),
        node("survey", "🔍 Survey Service\n(Query METOC metadata)", GREEN, w, 15.0, 13.0),
        node("seed", "🌱 Seed Service\n(Read DB + List Files)", GREEN, w, 15.0, 13.0),
        harvest,
        node("metoc", "🌐 METOC Server\n(External Weather Data)", GRAY, w, 15.0, 13.0),
    ];
    let edges = vec![
        flow("e1", "http-client", "forecast", None, BLUE, Solid, true),
        flow("e2", "forecast", "zephyr", Some("Read forecast data"), BLUE, Solid, true),
        flow("e3", "scheduled-heartbeat", "heartbeat", Some("Generate Correlation ID"), PINK, Solid, true),
        flow("e4", "heartbeat", "rabbitmq", Some("Publish to queues"), GREEN, Solid, true),
        flow("e5", "rabbitmq", "survey", Some("heartbeat.survey"), AMBER, Solid, true),
        flow("e6", "rabbitmq", "seed", Some("heartbeat.seed"), AMBER, Solid, true),
        flow("e7", "survey", "metoc", Some("Query metadata (COAMPS)"), GREEN, Dashed, false),
        flow("e8", "survey", "zephyr", Some("Write coverage + availability"), GREEN, Solid, true),
        flow("e9", "zephyr", "seed", Some("Read availability"), VIOLET, Dashed, false),
        flow("e10", "seed", "metoc", Some("Query files"), GREEN, Dashed, false),
        flow("e11", "seed", "rabbitmq", Some("Publish file metadata"), GREEN, Solid, true),
        flow("e12", "rabbitmq", "harvest", Some("harvest.filemetadata"), AMBER, Solid, true),
        flow("e13", "harvest", "metoc", Some("Download rasters"), GREEN, Dashed, false),
        flow("e14", "harvest", "zephyr", Some("Write rasters"), GREEN, Solid, true),
    ];
    let (title, description) = tab_text("message-flow");
    Diagram {
        id: "message-flow".to_string(),
        layout_name: "messageFlow".to_string(),
        title,
        description,
        nodes,
        edges,
        layout: auto(Size::new(w, 100.0), 200.0, 250.0),
        canvas: canvas(1000.0, true),
    }
}

fn correlation_flow() -> Diagram {
    let mut envelope = node(
        "envelope",
        "📦 Envelope[T]\n{\n  correlation_id: \"abc123\"\n  timestamp\n  payload: T\n}",
        AMBER,
        220.0,
        15.0,
        12.0,
    );
    envelope.style.font_family = Some("monospace".to_string());
    let mut logs = node(
        "logs",
        "📊 All Logs Include correlation_id\nQueryable in Grafana!",
        PINK,
        270.0,
        20.0,
        12.0,
    );
    logs.style.bold = true;
    let nodes = vec![
        placed(node("http-request", "📨 HTTP Request\nX-Correlation-ID: abc123", BLUE, 200.0, 15.0, 12.0), 50.0, 50.0),
        placed(node("rabbitmq-msg", "📬 RabbitMQ Message Flow", AMBER, 220.0, 15.0, 12.0), 550.0, 50.0),
        placed(
            node(
                "middleware",
                "🔧 Forecast Middleware\n• Extract Header\n• OR Generate\n• Add to Context\n• Add to Response",
                BLUE,
                200.0,
                15.0,
                12.0,
            ),
            50.0,
            180.0,
        ),
        placed(
            node("heartbeat-service", "💓 Heartbeat Service\ncorrelation.Generate()", GREEN, 220.0, 15.0, 12.0),
            550.0,
            180.0,
        ),
        placed(envelope, 550.0, 310.0),
        placed(
            node("context", "🔗 Context with ID\nctx = correlation.WithID(ctx, id)", VIOLET, 200.0, 15.0, 12.0),
            50.0,
            340.0,
        ),
        placed(node("nexus", "🔄 RabbitMQ Nexus\nJSON Message", AMBER, 220.0, 15.0, 12.0), 550.0, 450.0),
        placed(
            node(
                "handler",
                "⚙️ Handler\nlogger, id := correlation.Logger(ctx)\nAll logs include correlation_id",
                BLUE,
                200.0,
                15.0,
                11.0,
            ),
            50.0,
            490.0,
        ),
        placed(
            node(
                "consumer",
                "📥 Consumer\n• Unwrap Envelope\n• Extract correlation_id\n• Create logger with ID",
                GREEN,
                220.0,
                15.0,
                12.0,
            ),
            550.0,
            590.0,
        ),
        placed(logs, 300.0, 730.0),
    ];
    let edges = vec![
        trace("e1", "http-request", "middleware", None),
        trace("e2", "middleware", "context", Some("ctx = correlation.WithID(ctx, id)")),
        trace("e3", "context", "handler", None),
        trace("e4", "handler", "logs", Some("Log with ID")),
        trace("e5", "rabbitmq-msg", "heartbeat-service", None),
        trace("e6", "heartbeat-service", "envelope", Some("correlation.Generate()")),
        trace("e7", "envelope", "nexus", Some("JSON")),
        trace("e8", "nexus", "consumer", Some("Consume")),
        trace("e9", "consumer", "logs", Some("Log with ID")),
    ];
    let (title, description) = tab_text("correlation");
    Diagram {
        id: "correlation".to_string(),
        layout_name: "correlationFlow".to_string(),
        title,
        description,
        nodes,
        edges,
        layout: LayoutMode::Fixed,
        canvas: canvas(850.0, true),
    }
}

fn kubernetes_infra() -> Diagram {
    use Line::*;
    let w = 240.0;
    let nodes = vec![
        node(
            "ingress",
            "🌐 Nginx Ingress\nMutual TLS\ncdvn-guider-02.precisedevnet.com",
            BLUE,
            w,
            15.0,
            12.0,
        ),
        node("forecast-deploy", "📊 Forecast\nDeployment\nReplicas: 1\nPort: 8080", GREEN, w, 12.0, 11.0),
        node("survey-deploy", "🔍 Survey\nDeployment\nReplicas: 1", GREEN, w, 12.0, 11.0),
        node("seed-deploy", "🌱 Seed\nDeployment\nReplicas: 1", GREEN, w, 12.0, 11.0),
        node("harvest-deploy", "🌾 Harvest\nDeployment\nReplicas: 1", GREEN, w, 12.0, 11.0),
        node("heartbeat-deploy", "💓 Heartbeat\nDeployment\nReplicas: 1", GREEN, w, 12.0, 11.0),
        node(
            "nexus",
            "🔄 Nexus (RabbitMQ 4.0)\nDeployment\nPort: 5672 (AMQP)\nClusterIP Service\nSecret: nexus-pw",
            AMBER,
            w,
            12.0,
            11.0,
        ),
        node(
            "zephyr",
            "🗄️ Zephyr\nPostgreSQL 17 + PostGIS 3.5\nPort: 5432 | PVC: 200Gi\nNodePort: 30004\nMigration Job",
            VIOLET,
            w,
            12.0,
            11.0,
        ),
        node(
            "secrets",
            "🔐 Secrets\nguiderregcreds (ACR)\nmetoc-tls | devnet-tls\ndevnet-ca-cert",
            RED,
            w,
            12.0,
            11.0,
        ),
        node("storage", "💾 Storage Class\nceph-rbd\nCeph RBD Backend", GRAY, w, 12.0, 11.0),
        node("registry", "📦 Azure Container Registry\nguiderregistry.azurecr.io", SKY, w, 12.0, 11.0),
    ];
    let mut edges = vec![
        flow("e1", "ingress", "forecast-deploy", Some("HTTPS"), BLUE, Solid, true),
        flow("e2", "forecast-deploy", "zephyr", Some("Query DB"), GREEN, Solid, true),
        flow("e3", "survey-deploy", "nexus", Some("AMQP"), GREEN, Solid, true),
        flow("e4", "seed-deploy", "nexus", Some("AMQP"), GREEN, Solid, true),
        flow("e5", "harvest-deploy", "nexus", Some("AMQP"), GREEN, Solid, true),
        flow("e6", "heartbeat-deploy", "nexus", Some("Publish"), GREEN, Solid, true),
        flow("e7", "survey-deploy", "zephyr", Some("Write metadata"), GREEN, Solid, true),
        flow("e8", "seed-deploy", "zephyr", Some("Read DB"), GREEN, Dashed, false),
        flow("e9", "harvest-deploy", "zephyr", Some("Store rasters"), GREEN, Solid, true),
        flow("e10", "zephyr", "storage", Some("PVC"), VIOLET, Solid, false),
    ];
    let deployments = [
        "forecast-deploy",
        "survey-deploy",
        "seed-deploy",
        "harvest-deploy",
        "heartbeat-deploy",
    ];
    for (idx, target) in deployments.iter().enumerate() {
        let id = format!("e{}", 11 + idx);
        edges.push(flow(&id, "registry", target, Some("Pull Images"), SKY, Dashed, false));
    }
    for (idx, target) in deployments.iter().take(4).enumerate() {
        let id = format!("e{}", 16 + idx);
        edges.push(flow(&id, "secrets", target, Some("TLS Certs"), RED, Dashed, false));
    }
    let (title, description) = tab_text("kubernetes");
    Diagram {
        id: "kubernetes".to_string(),
        layout_name: "kubernetesInfra".to_string(),
        title,
        description,
        nodes,
        edges,
        layout: auto(Size::new(w, 120.0), 180.0, 220.0),
        canvas: canvas(1100.0, true),
    }
}
