//! Every catalogued type exposes a coherent record view.

use hdm_arena::ArenaSet;
use hdm_core::{FieldKind, NodeHeader, ObjectId, Ownership, TypeTag};
use hdm_model::Arenas;

#[test]
fn every_layout_matches_its_field_views() {
    let mut arenas = Arenas::default();
    for (position, tag) in Arenas::TAGS.iter().enumerate() {
        let arena = arenas.arena_mut(*tag).unwrap();
        let layout = arena.layout();
        let record = arena.make_record(ObjectId(position as u64 + 1));
        let name = record.class_name();
        let views = record.fields().len();
        let views_mut = record.fields_mut().len();
        assert_eq!((views, views_mut), (layout.len(), layout.len()), "{name}");
        assert_eq!(&layout[..NodeHeader::FIELD_COUNT], &[
            NodeHeader::PARENT,
            NodeHeader::FILE,
            NodeHeader::LINE,
            NodeHeader::COLUMN,
            NodeHeader::END_LINE,
            NodeHeader::END_COLUMN,
        ]);
    }
    assert_eq!(arenas.live_count(), Arenas::TAGS.len());
}

#[test]
fn every_link_target_class_is_known() {
    let arenas = Arenas::default();
    let classes: Vec<_> = arenas.arenas().flat_map(|a| a.ancestry().iter()).collect();
    for arena in arenas.arenas() {
        for desc in arena.layout() {
            let (FieldKind::Link(link) | FieldKind::Refs(link)) = desc.kind else {
                continue;
            };
            if link.ownership == Ownership::Parent {
                assert_eq!(link.class, None);
                continue;
            }
            let class = link.class.unwrap();
            assert!(
                classes.contains(&class),
                "{}.{} targets unknown class {}",
                arena.type_name(),
                desc.name,
                link.class_name
            );
        }
    }
}

#[test]
fn type_names_are_unique() {
    let arenas = Arenas::default();
    let mut names: Vec<&str> = Arenas::TAGS
        .iter()
        .filter_map(|tag| arenas.type_name(*tag))
        .collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), Arenas::TAGS.len());
    assert!(arenas.type_name(TypeTag(Arenas::TAGS.len() as u16 + 1)).is_none());
}
