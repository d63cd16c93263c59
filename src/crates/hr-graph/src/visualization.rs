//! Mermaid rendering for graphs
//!
//! Output is deterministic: nodes, edges and branch labels are emitted in
//! sorted order so diagrams can be committed and diffed.

use crate::graph::{Edge, Graph, END, START};
use crate::interrupt::InterruptConfig;

/// Render a graph as a Mermaid flowchart.
///
/// Conditional routers are drawn as diamonds, interrupt points get a dashed
/// orange border.
pub fn mermaid<S>(graph: &Graph<S>, interrupts: &InterruptConfig) -> String {
    let mut output = String::new();
    output.push_str("graph TD\n");

    output.push_str(&format!("    {}((START))\n", sanitize_id(START)));
    output.push_str(&format!(
        "    style {} fill:#90EE90,stroke:#228B22,stroke-width:3px\n",
        sanitize_id(START)
    ));
    output.push_str(&format!("    {}((END))\n", sanitize_id(END)));
    output.push_str(&format!(
        "    style {} fill:#FFB6C1,stroke:#DC143C,stroke-width:3px\n",
        sanitize_id(END)
    ));

    for node_id in graph.node_ids() {
        let spec = &graph.nodes[node_id];
        let label = match &spec.description {
            Some(description) => format!("{}<br/>{}", spec.name, escape_mermaid(description)),
            None => spec.name.clone(),
        };

        let conditional = matches!(graph.edge_from(node_id), Some(Edge::Conditional { .. }));
        let (open, close) = if conditional { ("{", "}") } else { ("[", "]") };
        output.push_str(&format!(
            "    {}{}\"{}\"{}\n",
            sanitize_id(node_id),
            open,
            label,
            close
        ));

        if interrupts.should_interrupt_before(node_id) || interrupts.should_interrupt_after(node_id) {
            output.push_str(&format!(
                "    style {} fill:#FFF3E0,stroke:#FF8C00,stroke-width:2px,stroke-dasharray: 5 5\n",
                sanitize_id(node_id)
            ));
        } else if conditional {
            output.push_str(&format!(
                "    style {} fill:#FFE4B5,stroke:#FF8C00,stroke-width:2px\n",
                sanitize_id(node_id)
            ));
        }
    }

    let mut sources: Vec<&String> = graph.edges.keys().collect();
    sources.sort();

    for from in sources {
        for edge in &graph.edges[from] {
            match edge {
                Edge::Direct(to) => {
                    output.push_str(&format!("    {} --> {}\n", sanitize_id(from), sanitize_id(to)));
                }
                Edge::Conditional { branches, .. } => {
                    let mut labels: Vec<&String> = branches.keys().collect();
                    labels.sort();
                    for label in labels {
                        output.push_str(&format!(
                            "    {} -.\"{}\".-> {}\n",
                            sanitize_id(from),
                            escape_mermaid(label),
                            sanitize_id(&branches[label])
                        ));
                    }
                }
            }
        }
    }

    output
}

/// Escape special characters for Mermaid labels
fn escape_mermaid(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Mermaid IDs must be alphanumeric plus underscore
fn sanitize_id(s: &str) -> String {
    s.replace("__", "").replace(['-', '.', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateGraph;
    use std::collections::HashMap;

    fn sample() -> StateGraph<u8> {
        let mut graph = StateGraph::new();
        graph.add_node("gate", |n: u8| async move { Ok(n) });
        graph.add_node("review", |n: u8| async move { Ok(n) });
        graph.add_edge(START, "gate");
        graph.add_conditional_edge(
            "gate",
            |n: &u8| if *n > 1 { "review" } else { "skip" }.to_string(),
            HashMap::from([
                ("review".to_string(), "review".to_string()),
                ("skip".to_string(), END.to_string()),
            ]),
        );
        graph.add_finish("review");
        graph
    }

    #[test]
    fn test_mermaid_output_is_stable() {
        let compiled = sample().compile().unwrap();
        let first = compiled.visualize_mermaid();
        let second = sample().compile().unwrap().visualize_mermaid();
        assert_eq!(first, second);

        assert!(first.starts_with("graph TD\n"));
        assert!(first.contains("    start --> gate\n"));
        assert!(first.contains("    gate{\"gate\"}\n"));
        assert!(first.contains("    review[\"review\"]\n"));

        let review = first.find("gate -.\"review\".-> review").unwrap();
        let skip = first.find("gate -.\"skip\".-> end").unwrap();
        assert!(review < skip);
    }

    #[test]
    fn test_interrupt_nodes_highlighted() {
        let compiled = sample()
            .compile_with_interrupts(
                InterruptConfig::new().with_interrupt_before(vec!["review".to_string()]),
            )
            .unwrap();

        let diagram = compiled.visualize_mermaid();
        assert!(diagram.contains("style review fill:#FFF3E0"));
        assert!(!diagram.contains("style gate fill:#FFF3E0"));
    }
}
