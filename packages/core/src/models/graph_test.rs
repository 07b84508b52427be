//! Tests for the Graph aggregate

#[cfg(test)]
mod tests {
    use crate::models::{
        EdgeType, EdgeUpdate, Graph, GraphError, GraphMetadataUpdate, GraphSettingsPatch,
        LayoutAlgorithm, NewEdge, NewNode, NodeType, NodeUpdate, Position,
    };

    fn page(graph: &mut Graph, id: &str) -> String {
        graph
            .add_node(NewNode::new(format!("ext-{}", id), id, NodeType::Page).with_id(id))
            .unwrap()
            .id
    }

    fn triangle() -> Graph {
        let mut graph = Graph::new("Triangle", "owner");
        page(&mut graph, "a");
        page(&mut graph, "b");
        page(&mut graph, "c");
        graph
            .add_edge(NewEdge::new("a", "b", EdgeType::Reference).with_id("ab"))
            .unwrap();
        graph
            .add_edge(NewEdge::new("b", "c", EdgeType::Reference).with_id("bc"))
            .unwrap();
        graph
            .add_edge(NewEdge::new("c", "a", EdgeType::Reference).with_id("ca"))
            .unwrap();
        graph
    }

    #[test]
    fn test_add_node_generates_id() {
        let mut graph = Graph::new("G", "owner");
        let node = graph
            .add_node(NewNode::new("page-1", "Page One", NodeType::Page))
            .unwrap();

        assert!(!node.id.is_empty());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node(&node.id), Some(&node));
    }

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut graph = Graph::new("G", "owner");
        page(&mut graph, "a");

        let duplicate = graph.add_node(NewNode::new("other", "Other", NodeType::Page).with_id("a"));

        assert!(duplicate.is_none());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node("a").unwrap().title, "a");
    }

    #[test]
    fn test_add_edge_with_missing_endpoint_returns_none() {
        let mut graph = Graph::new("G", "owner");
        page(&mut graph, "a");
        let before = graph.updated_at();

        assert!(graph
            .add_edge(NewEdge::new("a", "missing", EdgeType::Reference))
            .is_none());
        assert!(graph
            .add_edge(NewEdge::new("missing", "a", EdgeType::Reference))
            .is_none());

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.updated_at(), before);
    }

    #[test]
    fn test_try_add_edge_reports_missing_node() {
        let mut graph = Graph::new("G", "owner");
        page(&mut graph, "a");

        let err = graph
            .try_add_edge(NewEdge::new("a", "ghost", EdgeType::Custom).with_id("e1"))
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::InvalidReference {
                edge_id: "e1".to_string(),
                missing_node_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_add_edge_rejects_duplicate_edge_id() {
        let mut graph = triangle();
        let result = graph.add_edge(NewEdge::new("a", "c", EdgeType::Reference).with_id("ab"));

        assert!(result.is_none());
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.get_edge("ab").unwrap().target_id, "b");
    }

    #[test]
    fn test_edge_defaults() {
        let mut graph = triangle();
        let edge = graph.get_edge("ab").unwrap().clone();
        assert_eq!(edge.weight, 1.0);
        assert!(!edge.is_bidirectional);

        let weighted = graph
            .add_edge(NewEdge::new("a", "c", EdgeType::Custom).with_weight(2.5))
            .unwrap();
        assert_eq!(weighted.weight, 2.5);
    }

    #[test]
    fn test_remove_node_removes_touching_edges() {
        let mut graph = triangle();

        assert!(graph.remove_node("b"));

        assert_eq!(graph.node_count(), 2);
        assert!(graph.edges().all(|e| !e.touches("b")));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.get_edge("ca").is_some());
    }

    #[test]
    fn test_remove_every_node_leaves_no_dangling_edges() {
        for victim in ["a", "b", "c"] {
            let mut graph = triangle();
            graph.remove_node(victim);
            for edge in graph.edges() {
                assert!(graph.contains_node(&edge.source_id));
                assert!(graph.contains_node(&edge.target_id));
            }
        }
    }

    #[test]
    fn test_remove_missing_node_returns_false() {
        let mut graph = triangle();
        let before = graph.updated_at();

        assert!(!graph.remove_node("zzz"));
        assert_eq!(graph.updated_at(), before);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_get_node_edges_and_connected_nodes() {
        let mut graph = triangle();
        // Parallel edge must not duplicate the neighbour
        graph
            .add_edge(NewEdge::new("b", "a", EdgeType::Custom).with_id("ba"))
            .unwrap();

        let edges = graph.get_node_edges("a");
        assert_eq!(edges.len(), 3);

        let mut neighbours: Vec<&str> = graph
            .get_connected_nodes("a")
            .into_iter()
            .map(|n| n.id.as_str())
            .collect();
        neighbours.sort();
        assert_eq!(neighbours, vec!["b", "c"]);
    }

    #[test]
    fn test_updated_at_strictly_advances() {
        let mut graph = Graph::new("G", "owner");
        let mut last = graph.updated_at();

        page(&mut graph, "a");
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        page(&mut graph, "b");
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        graph.add_edge(NewEdge::new("a", "b", EdgeType::Reference));
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        graph.share_with_user("friend");
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        graph.share_with_user("friend");
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        graph.set_public_visibility(true);
        assert!(graph.updated_at() > last);
        last = graph.updated_at();

        graph.clear();
        assert!(graph.updated_at() > last);
    }

    #[test]
    fn test_node_updates_through_graph() {
        let mut graph = triangle();

        assert!(graph.update_node_title("a", "Alpha"));
        assert!(graph.update_node_position("a", Position::new(1.0, 2.0)));
        assert_eq!(graph.toggle_node_pinned("a"), Some(true));
        assert_eq!(graph.toggle_node_expanded("a"), Some(true));
        assert_eq!(graph.toggle_node_expanded("a"), Some(false));
        assert_eq!(graph.toggle_node_pinned("nope"), None);
        assert!(!graph.update_node_title("nope", "x"));

        let node = graph.get_node("a").unwrap();
        assert_eq!(node.title, "Alpha");
        assert_eq!(node.position, Some(Position::new(1.0, 2.0)));
        assert!(node.is_pinned);
        assert!(!node.is_expanded);

        let updated = graph
            .update_node("a", NodeUpdate::new().with_icon(Some("📄".to_string())))
            .unwrap();
        assert_eq!(updated.icon.as_deref(), Some("📄"));
        assert_eq!(updated.title, "Alpha");
    }

    #[test]
    fn test_update_and_remove_edge() {
        let mut graph = triangle();

        let edge = graph
            .update_edge(
                "ab",
                EdgeUpdate {
                    label: Some(Some("cites".to_string())),
                    is_bidirectional: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edge.label.as_deref(), Some("cites"));
        assert!(edge.connects("b", "a"));

        assert!(graph.remove_edge("ab"));
        assert!(!graph.remove_edge("ab"));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_update_metadata_and_settings() {
        let mut graph = Graph::new("Old", "owner");

        graph.update_metadata(GraphMetadataUpdate {
            name: Some("New".to_string()),
            description: Some(Some("desc".to_string())),
            tags: Some(vec!["research".to_string()]),
        });
        assert_eq!(graph.name(), "New");
        assert_eq!(graph.description(), Some("desc"));
        assert_eq!(graph.tags(), ["research".to_string()]);

        let physics_before = graph.settings().physics.clone();
        graph.update_settings(GraphSettingsPatch {
            layout: Some(LayoutAlgorithm::Radial),
            ..Default::default()
        });
        assert_eq!(graph.settings().layout, LayoutAlgorithm::Radial);
        assert_eq!(graph.settings().physics, physics_before);
    }

    #[test]
    fn test_sharing_and_access() {
        let mut graph = Graph::new("G", "owner");
        assert!(graph.can_access("owner"));
        assert!(!graph.can_access("friend"));

        assert!(graph.share_with_user("friend"));
        assert!(!graph.share_with_user("friend"));
        assert!(graph.can_access("friend"));
        assert!(!graph.can_edit("friend"));
        assert_eq!(graph.shared_with().count(), 1);

        assert!(graph.unshare_from_user("friend"));
        assert!(!graph.unshare_from_user("friend"));
        assert!(!graph.can_access("friend"));

        graph.set_public_visibility(true);
        assert!(graph.can_access("anyone"));
    }

    #[test]
    fn test_clear_empties_collections() {
        let mut graph = triangle();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_merge_existing_nodes_win() {
        let mut target = Graph::new("T", "owner");
        page(&mut target, "a");

        let mut other = Graph::new("O", "owner");
        other
            .add_node(NewNode::new("ext-other", "Other A", NodeType::Page).with_id("a"))
            .unwrap();
        page(&mut other, "d");
        other
            .add_edge(NewEdge::new("a", "d", EdgeType::Reference).with_id("ad"))
            .unwrap();

        let outcome = target.merge_graph(&other);

        assert_eq!(outcome.nodes_added, 1);
        assert_eq!(outcome.nodes_skipped, 1);
        assert_eq!(outcome.edges_added, 1);
        assert_eq!(target.get_node("a").unwrap().title, "a");
        assert!(target.get_edge("ad").is_some());
    }

    #[test]
    fn test_merge_skips_edges_with_taken_ids() {
        let mut target = triangle();

        let mut other = Graph::new("O", "owner");
        page(&mut other, "x");
        page(&mut other, "y");
        other
            .add_edge(NewEdge::new("x", "y", EdgeType::Custom).with_id("ab"))
            .unwrap();
        other
            .add_edge(NewEdge::new("y", "x", EdgeType::Custom).with_id("yx"))
            .unwrap();

        let outcome = target.merge_graph(&other);

        assert_eq!(outcome.nodes_added, 2);
        assert_eq!(outcome.edges_added, 1);
        assert_eq!(outcome.edges_skipped, 1);
        assert_eq!(target.get_edge("ab").unwrap().source_id, "a");
        assert!(target.get_edge("yx").is_some());
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let mut target = Graph::new("T", "owner");
        page(&mut target, "x");
        let other = triangle();

        target.merge_graph(&other);
        let (nodes, edges) = (target.node_count(), target.edge_count());

        let second = target.merge_graph(&other);
        assert_eq!(second.nodes_added, 0);
        assert_eq!(second.edges_added, 0);
        assert_eq!(target.node_count(), nodes);
        assert_eq!(target.edge_count(), edges);
    }

    #[test]
    fn test_stats_counts_by_type() {
        let mut graph = triangle();
        graph
            .add_node(NewNode::new("db", "Database", NodeType::Database).with_id("db"))
            .unwrap();
        graph
            .add_edge(NewEdge::new("db", "a", EdgeType::DatabaseRelation).bidirectional(true))
            .unwrap();

        let stats = graph.stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.nodes_by_type.get(&NodeType::Page), Some(&3));
        assert_eq!(stats.edges_by_type.get(&EdgeType::DatabaseRelation), Some(&1));
        assert_eq!(stats.bidirectional_edges, 1);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut graph = triangle()
            .with_description(Some("three pages".to_string()))
            .with_source_database("db-1");
        graph.share_with_user("friend");
        graph.update_node_position("a", Position::new(10.0, -4.5));

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["edges"].as_array().unwrap().len(), 3);
        assert_eq!(json["ownerId"], "owner");
        assert_eq!(json["nodes"][0]["type"], "page");

        let restored: Graph = serde_json::from_value(json).unwrap();
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_deserialize_rejects_dangling_edge() {
        let mut snapshot = triangle().to_snapshot();
        snapshot.nodes.retain(|n| n.id != "c");

        let err = Graph::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GraphError::InvalidReference { .. }));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_node() {
        let mut snapshot = triangle().to_snapshot();
        let copy = snapshot.nodes[0].clone();
        snapshot.nodes.push(copy);

        let err = Graph::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(_)));
    }

    #[test]
    fn test_serialization_round_trip_keeps_float_precision() {
        let mut graph = Graph::new("Floats", "owner");
        let mut metadata = crate::models::NodeMetadata::default();
        metadata
            .properties
            .insert("score".to_string(), serde_json::json!(0.1 + 0.2));
        graph
            .add_node(
                NewNode::new("ext-a", "a", NodeType::Page)
                    .with_id("a")
                    .with_position(Position::new(196.18872357624102, -0.1 - 0.2))
                    .with_metadata(metadata),
            )
            .unwrap();
        page(&mut graph, "b");
        graph
            .add_edge(
                NewEdge::new("a", "b", EdgeType::Reference)
                    .with_id("ab")
                    .with_weight(196.18872357624102 / 3.0),
            )
            .unwrap();
        graph.update_settings(GraphSettingsPatch {
            physics: Some(crate::models::PhysicsSettingsPatch {
                gravity: Some(0.1 + 0.7),
                ..Default::default()
            }),
            ..Default::default()
        });

        let json = serde_json::to_string(&graph).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();

        let position = restored.get_node("a").unwrap().position.unwrap();
        assert_eq!(position.x.to_bits(), 196.18872357624102_f64.to_bits());
        assert_eq!(
            restored.get_edge("ab").unwrap().weight.to_bits(),
            (196.18872357624102_f64 / 3.0).to_bits()
        );
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        let mut graph = triangle();
        let before = graph.clone();

        assert!(graph
            .add_edge(NewEdge::new("a", "b", EdgeType::Custom).with_weight(f64::NAN))
            .is_none());
        let err = graph
            .try_add_edge(
                NewEdge::new("a", "c", EdgeType::Custom)
                    .with_id("inf")
                    .with_weight(f64::INFINITY),
            )
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::NonFiniteValue {
                id: "inf".to_string(),
                field: "weight".to_string(),
            }
        );
        assert!(graph
            .update_edge(
                "ab",
                EdgeUpdate {
                    weight: Some(f64::NEG_INFINITY),
                    ..Default::default()
                },
            )
            .is_none());

        assert!(graph
            .add_node(
                NewNode::new("ext-d", "d", NodeType::Page)
                    .with_position(Position::new(f64::NAN, 0.0))
            )
            .is_none());
        assert!(!graph.update_node_position("a", Position::new(0.0, f64::INFINITY)));
        assert!(graph
            .update_node(
                "a",
                NodeUpdate {
                    title: Some("changed".to_string()),
                    position: Some(Some(Position::new(f64::NAN, 1.0))),
                    ..Default::default()
                },
            )
            .is_none());
        assert!(!graph.update_settings(GraphSettingsPatch {
            physics: Some(crate::models::PhysicsSettingsPatch {
                friction: Some(f64::NAN),
                ..Default::default()
            }),
            ..Default::default()
        }));

        assert_eq!(graph, before);
        let json = serde_json::to_string(&graph).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
    }
}
