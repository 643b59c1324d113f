//! The serializer session: arenas, symbols, handles and error reporting.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use hdm_arena::{ArenaSet, ErasedArena, Stored};
use hdm_core::{
    ClassId, ErrorKind, FieldKind, FieldMut, FieldRef, Identity, LinkDesc, NodeRef, ObjectId,
    Ownership, Record, SymbolId, SymbolTable, TypeTag, Typed,
};

use crate::config::{ConfigError, SerializerConfig};
use crate::handle::{Handle, HandleId};

/// Error callback: kind, message, primary object, optional secondary object.
///
/// Invoked synchronously at the point of detection. The message already
/// carries the primary object's source location when one is known.
pub type ErrorHandler = Box<dyn FnMut(ErrorKind, &str, Option<NodeRef>, Option<NodeRef>)>;

/// Handler installed by default: every condition goes to stderr and to a
/// `warn` event.
pub fn default_error_handler(
    kind: ErrorKind,
    message: &str,
    object: Option<NodeRef>,
    other: Option<NodeRef>,
) {
    warn!(code = kind.code(), ?object, ?other, "{message}");
    match object {
        Some(object) => eprintln!("hdm: {kind}: {message} ({object})"),
        None => eprintln!("hdm: {kind}: {message}"),
    }
}

/// One persistence session over catalogue `S`.
///
/// Owns every arena, the symbol table and the handle registry. Object ids
/// and handle ids come from per-session counters, so independent sessions
/// can coexist in one process.
pub struct Serializer<S: ArenaSet> {
    pub(crate) arenas: S,
    pub(crate) symbols: SymbolTable,
    pub(crate) handles: IndexMap<HandleId, NodeRef>,
    pub(crate) next_object: u64,
    next_handle: u64,
    pub(crate) config: SerializerConfig,
    error_handler: ErrorHandler,
}

impl<S: ArenaSet> Serializer<S> {
    /// Create a session with the default configuration.
    pub fn new() -> Self {
        Self {
            arenas: S::default(),
            symbols: SymbolTable::new(),
            handles: IndexMap::new(),
            next_object: 0,
            next_handle: 0,
            config: SerializerConfig::default(),
            error_handler: Box::new(default_error_handler),
        }
    }

    /// Create a session with a validated configuration.
    pub fn with_config(config: SerializerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// The arena catalogue.
    pub fn arenas(&self) -> &S {
        &self.arenas
    }

    // ── Symbols ─────────────────────────────────────────────────

    /// The session's symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The session's symbol table, mutably.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Intern a name; the empty string maps to the bad symbol.
    pub fn make_name(&mut self, text: &str) -> SymbolId {
        self.symbols.make_name(text)
    }

    /// Text of a name; the bad symbol reads as the empty string.
    pub fn name(&self, id: SymbolId) -> &str {
        self.symbols.name(id)
    }

    /// Freeze the current vocabulary and continue on a child layer.
    ///
    /// Every id handed out so far stays valid. The frozen table is returned
    /// so other sessions can layer on top of it too.
    pub fn freeze_symbols(&mut self) -> Arc<SymbolTable> {
        let current = std::mem::take(&mut self.symbols);
        let frozen = current.freeze();
        self.symbols = SymbolTable::layered(Arc::clone(&frozen));
        frozen
    }

    /// Continue on a child layer of an existing frozen vocabulary.
    ///
    /// Only meaningful on an empty session; symbols interned before the
    /// call are dropped.
    pub fn adopt_symbols(&mut self, parent: Arc<SymbolTable>) {
        self.symbols = SymbolTable::layered(parent);
    }

    // ── Construction ────────────────────────────────────────────

    pub(crate) fn allocate_id(&mut self) -> ObjectId {
        self.next_object += 1;
        ObjectId(self.next_object)
    }

    /// Allocate a default-initialised `T` and return its typed reference.
    pub fn make<T: Stored<S>>(&mut self) -> Typed<T> {
        let id = self.allocate_id();
        T::arena_mut(&mut self.arenas).make(id);
        Typed::from_raw(NodeRef::new(T::TAG, id))
    }

    /// Allocate a default-initialised record of the type stored under
    /// `tag`. `None` if the tag is not in the catalogue.
    pub fn make_dyn(&mut self, tag: TypeTag) -> Option<NodeRef> {
        let id = self.allocate_id();
        self.arenas.arena_mut(tag)?.make_record(id);
        Some(NodeRef::new(tag, id))
    }

    /// Borrow a `T`.
    pub fn get<T: Stored<S>>(&self, node: Typed<T>) -> Option<&T> {
        T::arena(&self.arenas).get(node.id())
    }

    /// Borrow a `T` mutably.
    pub fn get_mut<T: Stored<S>>(&mut self, node: Typed<T>) -> Option<&mut T> {
        T::arena_mut(&mut self.arenas).get_mut(node.id())
    }

    /// Borrow any node through the record view.
    pub fn node(&self, node: NodeRef) -> Option<&dyn Record> {
        self.arenas.arena(node.tag)?.record(node.id)
    }

    /// Borrow any node mutably through the record view.
    pub fn node_mut(&mut self, node: NodeRef) -> Option<&mut dyn Record> {
        self.arenas.arena_mut(node.tag)?.record_mut(node.id)
    }

    /// Whether `node` is resident.
    pub fn contains(&self, node: NodeRef) -> bool {
        self.arenas
            .arena(node.tag)
            .is_some_and(|arena| arena.contains(node.id))
    }

    // ── Casting ─────────────────────────────────────────────────

    /// Whether `node` is resident and belongs to class `U`.
    pub fn is_a<U: Identity>(&self, node: NodeRef) -> bool {
        self.node(node)
            .is_some_and(|record| record.is_a(U::CLASS_ID))
    }

    /// View `node` as class `U` (abstract or concrete). `None` if it is not
    /// a `U` or not resident.
    pub fn cast<U: Identity>(&self, node: NodeRef) -> Option<Typed<U>> {
        self.is_a::<U>(node).then(|| Typed::from_raw(node))
    }

    /// Borrow `node` as the concrete type `T`. `None` on any other type.
    pub fn downcast<T: Stored<S>>(&self, node: NodeRef) -> Option<&T> {
        if node.tag != T::TAG {
            return None;
        }
        T::arena(&self.arenas).get(node.id)
    }

    /// Borrow `node` mutably as the concrete type `T`.
    pub fn downcast_mut<T: Stored<S>>(&mut self, node: NodeRef) -> Option<&mut T> {
        if node.tag != T::TAG {
            return None;
        }
        T::arena_mut(&mut self.arenas).get_mut(node.id)
    }

    // ── Linking ─────────────────────────────────────────────────

    /// Set the parent back-reference of `child`. Whether `child` is resident.
    pub fn set_parent(&mut self, child: NodeRef, parent: Option<NodeRef>) -> bool {
        match self.node_mut(child) {
            Some(record) => {
                record.header_mut().parent = parent;
                true
            }
            None => false,
        }
    }

    /// Set the single-link field `field` of `owner`.
    ///
    /// The target must be resident and belong to the field's declared
    /// class. On mismatch [`ErrorKind::WrongObjectType`] is reported and
    /// the field is left unchanged. Attaching through an owning field also
    /// sets the target's parent to `owner`.
    pub fn set_link(&mut self, owner: NodeRef, field: &str, target: Option<NodeRef>) -> bool {
        let Some((slot, link)) = self.find_field(owner, field, false) else {
            return false;
        };
        if let Some(target) = target {
            if !self.check_target(owner, field, &link, target) {
                return false;
            }
        }
        self.store_link(owner, slot, target);
        if let (Some(target), Ownership::Owning) = (target, link.ownership) {
            self.set_parent(target, Some(owner));
        }
        true
    }

    /// Append `element` to the sequence field `field` of `owner`.
    ///
    /// `field` is either an inline reference list or an owning link to a
    /// sequence record; in the latter case the sequence is created on first
    /// use. The element is validated as in [`set_link`](Self::set_link).
    /// Elements of owning sequences get `owner` as their parent.
    pub fn push(&mut self, owner: NodeRef, field: &str, element: NodeRef) -> bool {
        if let Some((slot, link)) = self.find_field(owner, field, true) {
            if !self.check_target(owner, field, &link, element) {
                return false;
            }
            self.append(owner, slot, element);
            if link.ownership == Ownership::Owning {
                self.set_parent(element, Some(owner));
            }
            return true;
        }

        let Some((slot, link)) = self.find_field(owner, field, false) else {
            return false;
        };
        let Some(class) = link.class else {
            self.report_unmatched(owner, field);
            return false;
        };
        let Some(seq_tag) = self.tag_of(class) else {
            self.report_unmatched(owner, field);
            return false;
        };
        let Some(items) = self.sequence_items(seq_tag) else {
            self.report_unmatched(owner, field);
            return false;
        };
        if !self.check_target(owner, field, &items, element) {
            return false;
        }

        let current = self.link_value(owner, slot);
        let seq = match current.filter(|seq| self.contains(*seq)) {
            Some(seq) => seq,
            None => {
                let Some(seq) = self.make_dyn(seq_tag) else {
                    return false;
                };
                self.set_parent(seq, Some(owner));
                self.store_link(owner, slot, Some(seq));
                seq
            }
        };
        let Some(seq_slot) = self.refs_slot(seq) else {
            return false;
        };
        self.append(seq, seq_slot, element);
        self.set_parent(element, Some(owner));
        true
    }

    fn append(&mut self, owner: NodeRef, slot: usize, element: NodeRef) {
        if let Some(record) = self.node_mut(owner) {
            if let Some(FieldMut::Refs(items)) = record.fields_mut().into_iter().nth(slot) {
                items.push(element);
            }
        }
    }

    fn find_field(
        &mut self,
        owner: NodeRef,
        field: &str,
        refs: bool,
    ) -> Option<(usize, LinkDesc)> {
        let Some(descriptors) = self.node(owner).map(|record| record.descriptors()) else {
            debug!(%owner, field, "link on non-resident owner ignored");
            return None;
        };
        let found = descriptors
            .iter()
            .enumerate()
            .find_map(|(slot, desc)| match desc.kind {
                FieldKind::Link(link) if !refs && desc.name == field => Some((slot, link)),
                FieldKind::Refs(link) if refs && desc.name == field => Some((slot, link)),
                _ => None,
            });
        if found.is_none() && !refs {
            self.report_unmatched(owner, field);
        }
        found
    }

    fn link_value(&self, owner: NodeRef, slot: usize) -> Option<NodeRef> {
        let record = self.node(owner)?;
        let fields = record.fields();
        match fields.get(slot) {
            Some(FieldRef::Link(value)) => *value,
            _ => None,
        }
    }

    fn store_link(&mut self, owner: NodeRef, slot: usize, target: Option<NodeRef>) {
        if let Some(record) = self.node_mut(owner) {
            if let Some(FieldMut::Link(value)) = record.fields_mut().into_iter().nth(slot) {
                *value = target;
            }
        }
    }

    fn check_target(
        &mut self,
        owner: NodeRef,
        field: &str,
        link: &LinkDesc,
        target: NodeRef,
    ) -> bool {
        let Some(ancestry) = self.node(target).map(|record| record.ancestry()) else {
            let message = format!("{field} target {target} is not resident");
            self.report(ErrorKind::DanglingReference, &message, Some(owner), Some(target));
            return false;
        };
        if link.accepts(ancestry) {
            return true;
        }
        let owner_name = self.type_label(owner.tag);
        let target_name = self.type_label(target.tag);
        let message = format!(
            "adding wrong object type ({target_name}) in a {owner_name} {field} field; expected {}",
            link.class_name
        );
        self.report(ErrorKind::WrongObjectType, &message, Some(owner), Some(target));
        false
    }

    fn report_unmatched(&mut self, owner: NodeRef, field: &str) {
        let message = format!("{} has no field '{field}'", self.type_label(owner.tag));
        self.report(ErrorKind::UnmatchedFieldInPatternAssign, &message, Some(owner), None);
    }

    /// Tag of the concrete type whose class id is `class`.
    pub fn tag_of(&self, class: ClassId) -> Option<TypeTag> {
        self.arenas
            .arenas()
            .find(|arena| arena.ancestry().most_derived() == class)
            .map(|arena| arena.tag())
    }

    /// Element metadata of the sequence type stored under `tag`: its
    /// layout must end in a single owning reference list.
    fn sequence_items(&self, tag: TypeTag) -> Option<LinkDesc> {
        let arena = self.arenas.arena(tag)?;
        let mut structural = arena.layout().iter().filter(|d| d.structural);
        match (structural.next(), structural.next()) {
            (Some(desc), None) => match desc.kind {
                FieldKind::Refs(link) if link.ownership == Ownership::Owning => Some(link),
                _ => None,
            },
            _ => None,
        }
    }

    fn refs_slot(&self, seq: NodeRef) -> Option<usize> {
        self.node(seq)?
            .descriptors()
            .iter()
            .position(|d| matches!(d.kind, FieldKind::Refs(_)))
    }

    /// Remove one object. Linear in its arena's size; links to it are left
    /// dangling and written as null by the next Save.
    pub fn erase(&mut self, node: NodeRef) -> bool {
        self.arenas
            .arena_mut(node.tag)
            .is_some_and(|arena| arena.erase(node.id))
    }

    // ── Handles ─────────────────────────────────────────────────

    /// Register an external handle on `node`. The node becomes a root for
    /// collection and for the persisted root list.
    pub fn wrap(&mut self, node: impl Into<NodeRef>) -> Handle {
        let target = node.into();
        self.next_handle += 1;
        let id = HandleId(self.next_handle);
        self.handles.insert(id, target);
        Handle::new(id, target)
    }

    /// Drop a handle from the registry. Whether it was registered.
    pub fn release(&mut self, handle: &Handle) -> bool {
        self.handles.shift_remove(&handle.id()).is_some()
    }

    /// Every registered handle, in registration order.
    pub fn root_handles(&self) -> Vec<Handle> {
        self.handles
            .iter()
            .map(|(id, target)| Handle::new(*id, *target))
            .collect()
    }

    // ── Session ─────────────────────────────────────────────────

    /// Destroy every object, forget every handle and reset the symbol table.
    ///
    /// Id counters keep running so stale references can never alias new
    /// objects.
    pub fn purge(&mut self) {
        self.arenas.purge_all();
        self.symbols.purge();
        self.handles.clear();
    }

    /// Install an error callback, replacing the current one.
    pub fn set_error_handler(
        &mut self,
        handler: impl FnMut(ErrorKind, &str, Option<NodeRef>, Option<NodeRef>) + 'static,
    ) {
        self.error_handler = Box::new(handler);
    }

    /// Restore the default error callback.
    pub fn reset_error_handler(&mut self) {
        self.error_handler = Box::new(default_error_handler);
    }

    /// Report a model defect through the error callback.
    ///
    /// The primary object's source location, when known, is prefixed to
    /// the message.
    pub fn report(
        &mut self,
        kind: ErrorKind,
        message: &str,
        object: Option<NodeRef>,
        other: Option<NodeRef>,
    ) {
        let located = match object.and_then(|o| self.location(o)) {
            Some(location) => format!("{location}: {message}"),
            None => message.to_owned(),
        };
        (self.error_handler)(kind, &located, object, other);
    }

    /// `file:line` of a node, if it has a known line.
    pub fn location(&self, node: NodeRef) -> Option<String> {
        let span = self.node(node)?.header().span;
        if span.line == 0 {
            return None;
        }
        Some(format!("{}:{}", self.symbols.name(span.file), span.line))
    }

    pub(crate) fn type_label(&self, tag: TypeTag) -> &'static str {
        self.arenas.type_name(tag).unwrap_or("unknown")
    }

    pub(crate) fn arena_of(&self, tag: TypeTag) -> Option<&dyn ErasedArena> {
        self.arenas.arena(tag)
    }
}

impl<S: ArenaSet> Default for Serializer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ArenaSet> fmt::Debug for Serializer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("live", &self.arenas.live_count())
            .field("symbols", &self.symbols.len())
            .field("handles", &self.handles.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdm_model::{
        Arenas, Assignment, Begin, Constant, Design, Expr, Module, ModuleVec, Scope, Stmt,
    };
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    type Session = Serializer<Arenas>;

    fn recording(ser: &mut Session) -> Rc<RefCell<Vec<(ErrorKind, String)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        ser.set_error_handler(move |kind, message, _, _| {
            sink.borrow_mut().push((kind, message.to_owned()));
        });
        log
    }

    #[test]
    fn make_and_get() {
        let mut ser = Session::new();
        let module = ser.make::<Module>();
        let name = ser.make_name("top");
        ser.get_mut(module).unwrap().name = name;
        assert_eq!(ser.name(ser.get(module).unwrap().name), "top");
        assert_eq!(module.tag(), <Module as Stored<Arenas>>::TAG);
    }

    #[test]
    fn ids_are_unique_across_arenas() {
        let mut ser = Session::new();
        let a = ser.make::<Module>();
        let b = ser.make::<Design>();
        let c = ser.make::<Module>();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn cast_follows_ancestry() {
        let mut ser = Session::new();
        let begin = ser.make::<Begin>().raw();
        assert!(ser.cast::<Scope>(begin).is_some());
        assert!(ser.cast::<Stmt>(begin).is_some());
        assert!(ser.cast::<Expr>(begin).is_none());
        assert!(ser.downcast::<Begin>(begin).is_some());
        assert!(ser.downcast::<Module>(begin).is_none());
    }

    #[test]
    fn set_link_rejects_wrong_kind() {
        let mut ser = Session::new();
        let log = recording(&mut ser);
        let assign = ser.make::<Assignment>().raw();
        let module = ser.make::<Module>().raw();
        assert!(!ser.set_link(assign, "rhs", Some(module)));
        assert!(ser.downcast::<Assignment>(assign).unwrap().rhs.is_none());
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, ErrorKind::WrongObjectType);
        assert!(log[0].1.contains("wrong object type"));
    }

    #[test]
    fn set_link_owning_sets_parent() {
        let mut ser = Session::new();
        let assign = ser.make::<Assignment>().raw();
        let value = ser.make::<Constant>().raw();
        assert!(ser.set_link(assign, "rhs", Some(value)));
        assert_eq!(ser.downcast::<Assignment>(assign).unwrap().rhs, Some(value));
        assert_eq!(ser.node(value).unwrap().header().parent, Some(assign));
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut ser = Session::new();
        let log = recording(&mut ser);
        let assign = ser.make::<Assignment>().raw();
        assert!(!ser.set_link(assign, "nonesuch", None));
        assert_eq!(log.borrow()[0].0, ErrorKind::UnmatchedFieldInPatternAssign);
    }

    #[test]
    fn push_creates_sequence_on_first_use() {
        let mut ser = Session::new();
        let design = ser.make::<Design>();
        let m1 = ser.make::<Module>().raw();
        let m2 = ser.make::<Module>().raw();
        assert!(ser.push(design.raw(), "all_modules", m1));
        assert!(ser.push(design.raw(), "all_modules", m2));
        let seq = ser.get(design).unwrap().all_modules().unwrap();
        let seq: &ModuleVec = ser.get(seq).unwrap();
        assert_eq!(seq.items, vec![m1, m2]);
        assert_eq!(ser.arenas().module_vec.len(), 1);
        assert_eq!(ser.node(m1).unwrap().header().parent, Some(design.raw()));
    }

    #[test]
    fn push_validates_elements() {
        let mut ser = Session::new();
        let log = recording(&mut ser);
        let design = ser.make::<Design>().raw();
        let constant = ser.make::<Constant>().raw();
        assert!(!ser.push(design, "all_modules", constant));
        let module = ser.make::<Module>().raw();
        assert!(ser.push(design, "top_modules", module));
        assert_eq!(ser.downcast::<Design>(design).unwrap().top_modules, vec![module]);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn report_prefixes_location() {
        let mut ser = Session::new();
        let log = recording(&mut ser);
        let module = ser.make::<Module>();
        let file = ser.make_name("top.v");
        ser.get_mut(module).unwrap().header.span = hdm_core::Span::at(file, 12, 1);
        ser.report(ErrorKind::NonSynthesizable, "bad", Some(module.raw()), None);
        assert_eq!(log.borrow()[0].1, "top.v:12: bad");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn default_handler_still_surfaces_reports() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut ser = Session::new();
            let log = recording(&mut ser);
            ser.reset_error_handler();
            let module = ser.make::<Module>();
            let file = ser.make_name("top.v");
            ser.get_mut(module).unwrap().header.span = hdm_core::Span::at(file, 3, 1);
            ser.report(ErrorKind::NonSynthesizable, "bad", Some(module.raw()), None);
            assert!(log.borrow().is_empty());
        });
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("top.v:3: bad"), "{output}");
        assert!(output.contains("code=730"), "{output}");
    }

    #[test]
    fn handles_register_and_release() {
        let mut ser = Session::new();
        let design = ser.make::<Design>();
        let handle = ser.wrap(design);
        assert_eq!(ser.root_handles(), vec![handle]);
        assert!(ser.release(&handle));
        assert!(!ser.release(&handle));
        assert!(ser.root_handles().is_empty());
    }

    #[test]
    fn erase_and_purge() {
        let mut ser = Session::new();
        let a = ser.make::<Module>().raw();
        let b = ser.make::<Module>().raw();
        assert!(ser.erase(a));
        assert!(!ser.erase(a));
        assert!(ser.contains(b));
        ser.make_name("x");
        ser.wrap(b);
        ser.purge();
        assert!(!ser.contains(b));
        assert_eq!(ser.symbols().len(), 1);
        assert!(ser.root_handles().is_empty());
    }

    #[test]
    fn frozen_symbols_stay_resolvable() {
        let mut ser = Session::new();
        let clk = ser.make_name("clk");
        let base = ser.freeze_symbols();
        let rst = ser.make_name("rst");
        assert_eq!(ser.name(clk), "clk");
        assert_eq!(ser.name(rst), "rst");
        assert_eq!(base.find("rst"), SymbolId::BAD);
    }
}
