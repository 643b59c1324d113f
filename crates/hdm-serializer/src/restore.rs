//! Restore: rebuild a saved graph in two passes.
//!
//! Pass 1 allocates every record in saved order, which reproduces the dense
//! indices used by Save, and fills in scalar fields. Links are parked as raw
//! `(tag, index)` pairs. Once the symbol table and root list are read, pass
//! 2 resolves every parked link against the per-tag position tables.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use hdm_arena::ArenaSet;
use hdm_core::{
    FieldKind, FieldMut, LinkDesc, NodeRef, ObjectId, SymbolId, SymbolTable, TypeTag, BAD_SYMBOL,
};

use crate::codec::{
    decode_header, read_bool, read_i64_le, read_link, read_str, read_u16_le, read_u32_le,
};
use crate::error::FormatError;
use crate::handle::Handle;
use crate::serializer::Serializer;

/// Raw link value awaiting resolution.
enum Parked {
    One((u16, u32)),
    Many(Vec<(u16, u32)>),
}

/// A link field of a restored record, resolved in pass 2.
struct PendingLink {
    owner: NodeRef,
    slot: usize,
    field: &'static str,
    link: LinkDesc,
    value: Parked,
}

/// Ids allocated in pass 1, by tag, in saved order.
type Positions = HashMap<u16, Vec<ObjectId>>;

impl<S: ArenaSet> Serializer<S> {
    /// Replace the current graph with the one saved at `path`.
    ///
    /// Returns the persisted root handles, already registered. On any error
    /// the session is left empty.
    pub fn restore(&mut self, path: impl AsRef<Path>) -> Result<Vec<Handle>, FormatError> {
        self.purge();
        let file = File::open(path.as_ref())?;
        let mut r = BufReader::with_capacity(self.config.buffer_capacity, file);
        self.restore_from_reader(&mut r)
    }

    /// Replace the current graph with one read from a byte slice.
    pub fn restore_from_slice(&mut self, mut bytes: &[u8]) -> Result<Vec<Handle>, FormatError> {
        self.restore_from_reader(&mut bytes)
    }

    /// Replace the current graph with one read from any reader.
    ///
    /// The current graph, symbol table and handles are purged first. If the
    /// stream is rejected, everything built so far is purged again before
    /// the error is returned, so a partially restored graph is never
    /// observable.
    pub fn restore_from_reader(&mut self, r: &mut dyn Read) -> Result<Vec<Handle>, FormatError> {
        self.purge();
        match self.decode(r) {
            Ok(roots) => Ok(roots.into_iter().map(|root| self.wrap(root)).collect()),
            Err(e) => {
                self.purge();
                warn!(error = %e, "restore failed, graph purged");
                Err(e)
            }
        }
    }

    fn decode(&mut self, r: &mut dyn Read) -> Result<Vec<NodeRef>, FormatError> {
        decode_header(r)?;

        let blocks = read_u32_le(r)? as usize;
        if blocks != S::TAGS.len() {
            return Err(FormatError::Corrupt {
                detail: format!("{blocks} record blocks, catalogue has {}", S::TAGS.len()),
            });
        }

        let mut positions = Positions::new();
        let mut pending = Vec::new();
        let mut max_symbol = 0u32;

        // ── Pass 1: allocate and read scalars ──
        for tag in S::TAGS {
            let found = read_u16_le(r)?;
            if found != tag.0 {
                return Err(FormatError::TypeOrderMismatch {
                    expected: tag.0,
                    found,
                });
            }
            let count = read_u32_le(r)?;
            let Some(arena) = self.arenas.arena_mut(*tag) else {
                return Err(FormatError::UnknownTypeTag { tag: tag.0 });
            };
            let layout = arena.layout();
            let type_name = arena.type_name();
            let mut ids = Vec::new();
            for _ in 0..count {
                self.next_object += 1;
                let id = ObjectId(self.next_object);
                ids.push(id);
                let owner = NodeRef::new(*tag, id);
                let record = arena.make_record(id);
                for (slot, (desc, field)) in layout.iter().zip(record.fields_mut()).enumerate() {
                    match (desc.kind, field) {
                        (FieldKind::Bool, FieldMut::Bool(v)) => *v = read_bool(r)?,
                        (FieldKind::Int, FieldMut::Int(v)) => *v = read_i64_le(r)?,
                        (FieldKind::UInt, FieldMut::UInt(v)) => *v = read_u32_le(r)?,
                        (FieldKind::Symbol, FieldMut::Symbol(v)) => {
                            let raw = read_u32_le(r)?;
                            max_symbol = max_symbol.max(raw);
                            *v = SymbolId(raw);
                        }
                        (FieldKind::Link(link), FieldMut::Link(_)) => {
                            let raw = read_link(r)?;
                            if raw != (0, 0) {
                                pending.push(PendingLink {
                                    owner,
                                    slot,
                                    field: desc.name,
                                    link,
                                    value: Parked::One(raw),
                                });
                            }
                        }
                        (FieldKind::Refs(link), FieldMut::Refs(_)) => {
                            let len = read_u32_le(r)?;
                            let mut raws = Vec::new();
                            for _ in 0..len {
                                let raw = read_link(r)?;
                                if raw.0 == 0 {
                                    return Err(FormatError::Corrupt {
                                        detail: format!(
                                            "null element in {type_name}.{}",
                                            desc.name
                                        ),
                                    });
                                }
                                raws.push(raw);
                            }
                            if !raws.is_empty() {
                                pending.push(PendingLink {
                                    owner,
                                    slot,
                                    field: desc.name,
                                    link,
                                    value: Parked::Many(raws),
                                });
                            }
                        }
                        (kind, _) => {
                            return Err(FormatError::Corrupt {
                                detail: format!(
                                    "{type_name}.{} is not a {} field",
                                    desc.name,
                                    kind.label()
                                ),
                            });
                        }
                    }
                }
            }
            positions.insert(tag.0, ids);
        }

        // ── Symbols ──
        let symbol_count = read_u32_le(r)?;
        let mut symbols = SymbolTable::new();
        for position in 0..symbol_count {
            let text = read_str(r)?;
            if position == 0 {
                if text != BAD_SYMBOL {
                    return Err(FormatError::Corrupt {
                        detail: format!("symbol 0 is {text:?}, expected the bad symbol"),
                    });
                }
                continue;
            }
            let id = symbols.intern(&text);
            if id.0 != position {
                return Err(FormatError::Corrupt {
                    detail: format!("symbol {text:?} repeated at id {position}"),
                });
            }
        }
        if symbol_count == 0 || max_symbol >= symbol_count {
            return Err(FormatError::Corrupt {
                detail: format!("symbol id {max_symbol} outside table of {symbol_count}"),
            });
        }
        self.symbols = symbols;

        // ── Roots ──
        let root_count = read_u32_le(r)?;
        let mut roots = Vec::new();
        for _ in 0..root_count {
            let raw = read_link(r)?;
            roots.push(resolve(&positions, raw)?);
        }

        let mut probe = [0u8; 1];
        if r.read(&mut probe)? != 0 {
            return Err(FormatError::Corrupt {
                detail: "trailing bytes after root list".to_owned(),
            });
        }

        // ── Pass 2: resolve links ──
        let links = pending.len();
        for link in pending {
            self.resolve_link(&positions, link)?;
        }

        debug!(
            objects = positions.values().map(Vec::len).sum::<usize>(),
            links,
            symbols = symbol_count,
            roots = roots.len(),
            "graph restored"
        );
        Ok(roots)
    }

    fn resolve_link(
        &mut self,
        positions: &Positions,
        pending: PendingLink,
    ) -> Result<(), FormatError> {
        let targets = match &pending.value {
            Parked::One(raw) => vec![resolve(positions, *raw)?],
            Parked::Many(raws) => raws
                .iter()
                .map(|raw| resolve(positions, *raw))
                .collect::<Result<Vec<_>, _>>()?,
        };
        for target in &targets {
            let ancestry = self
                .arenas
                .ancestry(target.tag)
                .ok_or(FormatError::UnknownTypeTag { tag: target.tag.0 })?;
            if !pending.link.accepts(ancestry) {
                return Err(FormatError::KindMismatch {
                    field: pending.field,
                    expected: pending.link.class_name,
                    found: self.type_label(target.tag),
                });
            }
        }

        let record = self
            .arenas
            .arena_mut(pending.owner.tag)
            .and_then(|arena| arena.record_mut(pending.owner.id))
            .ok_or(FormatError::UnknownTypeTag {
                tag: pending.owner.tag.0,
            })?;
        match (record.fields_mut().into_iter().nth(pending.slot), pending.value) {
            (Some(FieldMut::Link(value)), Parked::One(_)) => *value = targets.first().copied(),
            (Some(FieldMut::Refs(items)), Parked::Many(_)) => *items = targets,
            _ => {
                return Err(FormatError::Corrupt {
                    detail: format!("field {} changed shape during restore", pending.field),
                });
            }
        }
        Ok(())
    }
}

/// Map a saved `(tag, index)` pair to the object allocated for it.
fn resolve(positions: &Positions, (tag, index): (u16, u32)) -> Result<NodeRef, FormatError> {
    let ids = positions
        .get(&tag)
        .ok_or(FormatError::UnknownTypeTag { tag })?;
    let count = ids.len() as u32;
    if index == 0 || index > count {
        return Err(FormatError::IndexOutOfRange { tag, index, count });
    }
    Ok(NodeRef::new(TypeTag(tag), ids[index as usize - 1]))
}
