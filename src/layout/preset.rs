use std::collections::BTreeMap;

use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Fps};
use crate::geometry::edge::{Anchor, Side};
use crate::geometry::route::{Axis, RouteStyle};
use crate::layout::config::{ConnectionDef, DiagramConfig, NodeDef, Theme};
use crate::layout::model::NodeKind;
use crate::particle::ParticleTuning;

const ICONS: [(&str, &str); 10] = [
    ("folder", "icons/folder.png"),
    ("github", "icons/github.png"),
    ("githubActions", "icons/github-actions.png"),
    ("docker", "icons/docker.png"),
    ("aws", "icons/aws.png"),
    ("dockerHub", "icons/dockerhub.png"),
    ("webhook", "icons/webhook.png"),
    ("argocd", "icons/argocd.png"),
    ("kubernetes", "icons/kubernetes.png"),
    ("git", "icons/git.png"),
];

struct Spec {
    id: &'static str,
    x: f64,
    y: f64,
    w: f64,
    color: u32,
    label: &'static str,
    subtext: Option<&'static str>,
    icons: &'static [&'static str],
}

const NODE_HEIGHT: f64 = 140.0;

#[rustfmt::skip]
const NODES: [Spec; 10] = [
    Spec { id: "sourceBox", x: 55.0, y: 90.0, w: 210.0, color: 0xd97706ff, label: "Source Code", subtext: None, icons: &["folder"] },
    Spec { id: "github", x: 335.0, y: 90.0, w: 180.0, color: 0x24292eff, label: "GitHub", subtext: None, icons: &["github"] },
    Spec { id: "action", x: 585.0, y: 90.0, w: 180.0, color: 0x1e3a8aff, label: "GitHub Action", subtext: Some("Build & Push"), icons: &["githubActions"] },
    Spec { id: "dockerImage", x: 835.0, y: 90.0, w: 180.0, color: 0x0073ecff, label: "Docker Image", subtext: None, icons: &["docker"] },
    Spec { id: "registry", x: 1085.0, y: 90.0, w: 210.0, color: 0x7c3aedff, label: "ECR / Docker Hub", subtext: None, icons: &["aws", "dockerHub"] },
    Spec { id: "webhook", x: 55.0, y: 470.0, w: 210.0, color: 0xdb2777ff, label: "Webhook Event", subtext: Some("Detect Change"), icons: &["webhook"] },
    Spec { id: "githubActions2", x: 335.0, y: 470.0, w: 180.0, color: 0x1e3a8aff, label: "GitHub Actions", subtext: Some("Update Helm"), icons: &["githubActions"] },
    Spec { id: "gitRepo", x: 585.0, y: 470.0, w: 180.0, color: 0xbe123cff, label: "Git Repository", subtext: Some("UpdateValue.yml"), icons: &["git"] },
    Spec { id: "argocd", x: 835.0, y: 470.0, w: 180.0, color: 0x000000ff, label: "ArgoCD", subtext: Some("Sync & Deploy"), icons: &["argocd"] },
    Spec { id: "kubernetes", x: 1085.0, y: 470.0, w: 210.0, color: 0x36454fff, label: "Kubernetes", subtext: Some("Update Pods"), icons: &["kubernetes"] },
];

const CONNECTIONS: [(&str, &str, &str); 9] = [
    ("sourceBox", "github", "Push"),
    ("github", "action", "Trigger"),
    ("action", "dockerImage", "Build"),
    ("dockerImage", "registry", "Push"),
    ("registry", "webhook", "Event"),
    ("webhook", "githubActions2", "Trigger"),
    ("githubActions2", "gitRepo", "Update"),
    ("gitRepo", "argocd", "Sync"),
    ("argocd", "kubernetes", "Deploy"),
];

fn rgba_u32(v: u32) -> Color {
    let [r, g, b, a] = v.to_be_bytes();
    Color::rgba8(r, g, b, a)
}

impl DiagramConfig {
    /// The built-in CI/CD pipeline: a CI row (source → GitHub → action → image → registry),
    /// an orthogonal "Event" bridge down to the CD row (webhook → actions → git → ArgoCD →
    /// Kubernetes).
    pub fn ci_cd_preset() -> Self {
        let nodes = NODES
            .iter()
            .map(|s| {
                let (icon, icons) = match s.icons {
                    [single] => (Some((*single).to_owned()), Vec::new()),
                    many => (None, many.iter().map(|k| (*k).to_owned()).collect()),
                };
                NodeDef {
                    id: s.id.to_owned(),
                    x: s.x,
                    y: s.y,
                    width: s.w,
                    height: NODE_HEIGHT,
                    kind: NodeKind::Box,
                    color: Some(rgba_u32(s.color)),
                    label: s.label.to_owned(),
                    subtext: s.subtext.map(str::to_owned),
                    icon,
                    icons,
                }
            })
            .collect();

        let connections = CONNECTIONS
            .iter()
            .map(|&(from, to, label)| {
                let bridge = from == "registry" && to == "webhook";
                ConnectionDef {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    label: Some(label.to_owned()),
                    route: if bridge {
                        RouteStyle::Orthogonal { via: Axis::Vertical }
                    } else {
                        RouteStyle::Straight
                    },
                    from_anchor: bridge.then_some(Anchor::new(Side::Bottom, -50.0)),
                    to_anchor: bridge.then_some(Anchor::new(Side::Top, 50.0)),
                }
            })
            .collect();

        Self {
            surface: Canvas {
                width: 1350,
                height: 700,
            },
            background: Color::rgba8(0x0f, 0x14, 0x19, 0xff),
            seed: 0,
            fps: Fps { num: 60, den: 1 },
            font: Some("fonts/label.ttf".to_owned()),
            icons: ICONS
                .iter()
                .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                .collect::<BTreeMap<_, _>>(),
            nodes,
            connections,
            particles: ParticleTuning::default(),
            theme: Theme::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/preset.rs"]
mod tests;
