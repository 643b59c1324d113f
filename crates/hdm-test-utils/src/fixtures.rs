//! Standard fixture graphs.
//!
//! - [`scenario_a`]: a design with one top module owning two children.
//! - [`scenario_b`]: an assignment plus an unattached module of the wrong
//!   kind for its operand fields.
//! - [`wide_design`]: a parameterised design touching every node type.

use hdm_core::{NodeRef, Span, Typed};
use hdm_model::{
    Always, Assignment, Begin, Constant, DelayControl, Design, Initial, Module, Net, Operation,
    Package, Port, RefObj,
};
use hdm_serializer::Handle;

use crate::Session;

/// Nodes of [`scenario_a`].
#[derive(Clone, Copy, Debug)]
pub struct ScenarioA {
    pub design: Typed<Design>,
    pub top: Typed<Module>,
    pub children: [Typed<Module>; 2],
    pub root: Handle,
}

/// One design named `chip`, owning a module sequence that holds only the
/// top module `top`. The two children `u0` and `u1` are reachable only
/// through the top module's own sequence.
pub fn scenario_a(ser: &mut Session) -> ScenarioA {
    let design = ser.make::<Design>();
    let chip = ser.make_name("chip");
    ser.get_mut(design).unwrap().name = chip;

    let top = named_module(ser, "top");
    ser.get_mut(top).unwrap().top_module = true;
    ser.push(design.raw(), "all_modules", top.raw());
    ser.push(design.raw(), "top_modules", top.raw());

    let u0 = named_module(ser, "u0");
    let u1 = named_module(ser, "u1");
    for child in [u0, u1] {
        ser.push(top.raw(), "modules", child.raw());
        ser.set_link(child.raw(), "module", Some(top.raw()));
    }

    let root = ser.wrap(design);
    ScenarioA {
        design,
        top,
        children: [u0, u1],
        root,
    }
}

/// Nodes of [`scenario_b`].
#[derive(Clone, Copy, Debug)]
pub struct ScenarioB {
    pub root: Handle,
    pub assignment: Typed<Assignment>,
    pub intruder: Typed<Module>,
}

/// A rooted design whose top module runs `always q = <rhs>` with `rhs`
/// unset, and a module that is not attached anywhere.
pub fn scenario_b(ser: &mut Session) -> ScenarioB {
    let design = ser.make::<Design>();
    let top = named_module(ser, "top");
    ser.push(design.raw(), "all_modules", top.raw());

    let always = ser.make::<Always>();
    ser.push(top.raw(), "processes", always.raw());
    let assignment = ser.make::<Assignment>();
    ser.get_mut(assignment).unwrap().blocking = true;
    ser.set_link(always.raw(), "stmt", Some(assignment.raw()));
    let q = ref_obj(ser, "q", None);
    ser.set_link(assignment.raw(), "lhs", Some(q));

    let intruder = named_module(ser, "intruder");
    let root = ser.wrap(design);
    ScenarioB {
        root,
        assignment,
        intruder,
    }
}

/// Shape of one module in a [`GraphSpec`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: String,
    pub nets: Vec<String>,
    pub ports: usize,
    pub children: usize,
    pub statements: usize,
    pub decay: i64,
}

/// Shape of a design built by [`wide_design`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphSpec {
    pub name: String,
    pub modules: Vec<ModuleSpec>,
    pub packages: usize,
}

impl GraphSpec {
    /// `modules` modules with `width` nets, ports, children and statements
    /// each.
    pub fn wide(modules: usize, width: usize) -> Self {
        Self {
            name: "wide".to_owned(),
            modules: (0..modules)
                .map(|m| ModuleSpec {
                    name: format!("m{m}"),
                    nets: (0..width).map(|n| format!("n{n}")).collect(),
                    ports: width,
                    children: width,
                    statements: width,
                    decay: m as i64,
                })
                .collect(),
            packages: 1,
        }
    }
}

/// Build the design described by `spec` and wrap it as a root.
///
/// The first module is the top module. Ports connect to nets through
/// reference objects, statements live in an `initial` block and assign
/// two-operand operations to nets.
pub fn wide_design(ser: &mut Session, spec: &GraphSpec) -> Handle {
    let design = ser.make::<Design>();
    let name = ser.make_name(&spec.name);
    ser.get_mut(design).unwrap().name = name;
    let file = ser.make_name("fixture.v");

    for (position, module_spec) in spec.modules.iter().enumerate() {
        let module = named_module(ser, &module_spec.name);
        {
            let record = ser.get_mut(module).unwrap();
            record.header.span = Span::at(file, position as u32 + 1, 1);
            record.def_decay_time = module_spec.decay;
            record.top_module = position == 0;
        }
        ser.push(design.raw(), "all_modules", module.raw());
        if position == 0 {
            ser.push(design.raw(), "top_modules", module.raw());
        }

        let mut nets = Vec::with_capacity(module_spec.nets.len());
        for net_name in &module_spec.nets {
            let net = ser.make::<Net>();
            let text = ser.make_name(net_name);
            let record = ser.get_mut(net).unwrap();
            record.name = text;
            record.full_name = text;
            ser.push(module.raw(), "nets", net.raw());
            nets.push(net.raw());
        }

        for index in 0..module_spec.ports {
            let port = ser.make::<Port>();
            let text = ser.make_name(&format!("p{index}"));
            {
                let record = ser.get_mut(port).unwrap();
                record.name = text;
                record.direction = [Port::INPUT, Port::OUTPUT, Port::INOUT][index % 3];
            }
            let target = pick(&nets, index);
            let conn = ref_obj(ser, &format!("p{index}_conn"), target);
            ser.set_link(port.raw(), "high_conn", Some(conn));
            ser.push(module.raw(), "ports", port.raw());
        }

        for index in 0..module_spec.children {
            let child = named_module(ser, &format!("{}_c{index}", module_spec.name));
            ser.push(module.raw(), "modules", child.raw());
            ser.set_link(child.raw(), "module", Some(module.raw()));
        }

        if module_spec.statements > 0 {
            let initial = ser.make::<Initial>();
            let block = ser.make::<Begin>();
            ser.set_link(initial.raw(), "stmt", Some(block.raw()));
            for index in 0..module_spec.statements {
                let stmt = assignment(ser, pick(&nets, index), index as i64);
                if index % 2 == 1 {
                    let delay = ser.make::<DelayControl>();
                    let amount = ser.make_name(&format!("#{index}"));
                    ser.get_mut(delay).unwrap().delay = amount;
                    ser.set_link(delay.raw(), "stmt", Some(stmt));
                    ser.push(block.raw(), "stmts", delay.raw());
                } else {
                    ser.push(block.raw(), "stmts", stmt);
                }
            }
            ser.push(module.raw(), "processes", initial.raw());
        }
    }

    for index in 0..spec.packages {
        let package = ser.make::<Package>();
        let text = ser.make_name(&format!("pkg{index}"));
        ser.get_mut(package).unwrap().name = text;
        ser.push(design.raw(), "all_packages", package.raw());
    }

    ser.wrap(design)
}

fn named_module(ser: &mut Session, name: &str) -> Typed<Module> {
    let module = ser.make::<Module>();
    let text = ser.make_name(name);
    let record = ser.get_mut(module).unwrap();
    record.name = text;
    record.def_name = text;
    record.full_name = text;
    module
}

fn ref_obj(ser: &mut Session, name: &str, actual: Option<NodeRef>) -> NodeRef {
    let node = ser.make::<RefObj>();
    let text = ser.make_name(name);
    ser.get_mut(node).unwrap().name = text;
    if actual.is_some() {
        ser.set_link(node.raw(), "actual", actual);
    }
    node.raw()
}

fn constant(ser: &mut Session, value: i64) -> NodeRef {
    let node = ser.make::<Constant>();
    let text = ser.make_name(&value.to_string());
    let record = ser.get_mut(node).unwrap();
    record.value = text;
    record.size = 32;
    node.raw()
}

fn assignment(ser: &mut Session, target: Option<NodeRef>, seed: i64) -> NodeRef {
    let node = ser.make::<Assignment>();
    ser.get_mut(node).unwrap().blocking = seed % 2 == 0;
    let lhs = ref_obj(ser, "lhs", target);
    let op = ser.make::<Operation>();
    ser.get_mut(op).unwrap().op_type = 24;
    for operand in [seed, seed + 1] {
        let value = constant(ser, operand);
        ser.push(op.raw(), "operands", value);
    }
    ser.set_link(node.raw(), "lhs", Some(lhs));
    ser.set_link(node.raw(), "rhs", Some(op.raw()));
    node.raw()
}

fn pick(nets: &[NodeRef], index: usize) -> Option<NodeRef> {
    (!nets.is_empty()).then(|| nets[index % nets.len()])
}
