//! Save: write every live object, the symbol table and the root list.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use hdm_arena::{ArenaSet, IndexTable};
use hdm_core::{ErrorKind, FieldKind, FieldRef, LinkDesc, NodeRef};

use crate::codec::{
    encode_header, write_i64_le, write_len, write_link, write_str, write_u16_le, write_u32_le,
    write_u8,
};
use crate::error::FormatError;
use crate::serializer::Serializer;

/// A link written as null because its target had the wrong class.
struct Defect {
    owner: NodeRef,
    target: NodeRef,
    field: &'static str,
    expected: &'static str,
}

impl<S: ArenaSet> Serializer<S> {
    /// Save the graph to `path`, creating or truncating the file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let file = File::create(path.as_ref())?;
        let mut w = BufWriter::with_capacity(self.config.buffer_capacity, file);
        self.save_to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }

    /// Save the graph into an in-memory buffer.
    pub fn save_to_vec(&mut self) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::new();
        self.save_to_writer(&mut buf)?;
        Ok(buf)
    }

    /// Save the graph to any writer.
    ///
    /// Links whose target is no longer resident are written as null. When
    /// [`verify_kinds_on_save`](crate::SerializerConfig::verify_kinds_on_save)
    /// is set, links whose target does not belong to the field's declared
    /// class are written as null too and reported as
    /// [`ErrorKind::WrongObjectType`] once the stream is complete.
    pub fn save_to_writer(&mut self, w: &mut dyn Write) -> Result<(), FormatError> {
        let mut table = IndexTable::default();
        for arena in self.arenas.arenas() {
            arena.assign_indices(&mut table);
        }

        let mut defects = Vec::new();
        encode_header(w)?;
        write_len(w, S::TAGS.len())?;
        for tag in S::TAGS {
            let Some(arena) = self.arenas.arena(*tag) else {
                return Err(FormatError::UnknownTypeTag { tag: tag.0 });
            };
            write_u16_le(w, tag.0)?;
            write_len(w, arena.len())?;
            for record in arena.records() {
                let owner = NodeRef::new(*tag, record.id());
                let fields = record.fields();
                for (desc, value) in record.descriptors().iter().zip(fields.iter()) {
                    match (desc.kind, value) {
                        (FieldKind::Bool, FieldRef::Bool(v)) => write_u8(w, u8::from(*v))?,
                        (FieldKind::Int, FieldRef::Int(v)) => write_i64_le(w, *v)?,
                        (FieldKind::UInt, FieldRef::UInt(v)) => write_u32_le(w, *v)?,
                        (FieldKind::Symbol, FieldRef::Symbol(v)) => write_u32_le(w, v.0)?,
                        (FieldKind::Link(link), FieldRef::Link(target)) => {
                            let encoded = target.and_then(|target| {
                                self.encode_target(
                                    &table,
                                    owner,
                                    desc.name,
                                    &link,
                                    target,
                                    &mut defects,
                                )
                            });
                            match encoded {
                                Some((tag, index)) => write_link(w, tag, index)?,
                                None => write_link(w, 0, 0)?,
                            }
                        }
                        (FieldKind::Refs(link), FieldRef::Refs(targets)) => {
                            let encoded: Vec<(u16, u32)> = targets
                                .iter()
                                .filter_map(|target| {
                                    self.encode_target(
                                        &table,
                                        owner,
                                        desc.name,
                                        &link,
                                        *target,
                                        &mut defects,
                                    )
                                })
                                .collect();
                            write_len(w, encoded.len())?;
                            for (tag, index) in encoded {
                                write_link(w, tag, index)?;
                            }
                        }
                        (kind, _) => {
                            return Err(FormatError::Corrupt {
                                detail: format!(
                                    "{}.{} does not hold a {} value",
                                    arena.type_name(),
                                    desc.name,
                                    kind.label()
                                ),
                            });
                        }
                    }
                }
            }
        }

        let symbols = self.symbols.symbols();
        write_len(w, symbols.len())?;
        for text in &symbols {
            write_str(w, text)?;
        }

        let roots: Vec<(u16, u32)> = self
            .handles
            .values()
            .filter_map(|root| match table.encode(*root) {
                Some(index) => Some((root.tag.0, index)),
                None => {
                    debug!(%root, "dangling root handle skipped");
                    None
                }
            })
            .collect();
        write_len(w, roots.len())?;
        for (tag, index) in &roots {
            write_link(w, *tag, *index)?;
        }

        debug!(
            objects = table.len(),
            symbols = symbols.len(),
            roots = roots.len(),
            defects = defects.len(),
            "graph saved"
        );

        for defect in defects {
            let message = format!(
                "saving wrong object type ({}) in a {} {} field; expected {}",
                self.type_label(defect.target.tag),
                self.type_label(defect.owner.tag),
                defect.field,
                defect.expected
            );
            self.report(
                ErrorKind::WrongObjectType,
                &message,
                Some(defect.owner),
                Some(defect.target),
            );
        }
        Ok(())
    }

    /// Resolve a link target to its `(tag, index)` pair, or `None` if it
    /// must be written as null.
    fn encode_target(
        &self,
        table: &IndexTable,
        owner: NodeRef,
        field: &'static str,
        link: &LinkDesc,
        target: NodeRef,
        defects: &mut Vec<Defect>,
    ) -> Option<(u16, u32)> {
        let Some(index) = table.encode(target) else {
            debug!(%owner, field, %target, "dangling link written as null");
            return None;
        };
        if self.config.verify_kinds_on_save {
            let accepted = self
                .arenas
                .ancestry(target.tag)
                .is_some_and(|ancestry| link.accepts(ancestry));
            if !accepted {
                defects.push(Defect {
                    owner,
                    target,
                    field,
                    expected: link.class_name,
                });
                return None;
            }
        }
        Some((target.tag.0, index))
    }
}
