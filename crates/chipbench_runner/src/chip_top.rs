//! Behavioral model of the chip-top counter design.
//!
//! The pad ring exposes a clock, an active-low reset, a 12-bit input bus,
//! and a 40-bit bidirectional bus. The core is a counter: on every rising
//! clock edge it clears while reset is held, and otherwise increments while
//! every input pad reads `1`. The count is driven onto the bidirectional
//! pads.
//!
//! Gate-level builds add the `VDD` and `VSS` rails. Until they read `1`
//! and `0`, the outputs are `X` and the counter state is lost.

use chipbench_common::{Logic, LogicVec};
use chipbench_sim::{Model, ModelContext, PortBuilder, PortDecl, SignalId, SimError};

/// Width of `input_PAD`.
pub const INPUT_WIDTH: u32 = 12;
/// Width of `bidir_PAD`.
pub const BIDIR_WIDTH: u32 = 40;

const COUNT_MASK: u64 = (1 << BIDIR_WIDTH) - 1;

#[derive(Clone, Copy)]
struct Pins {
    clk: SignalId,
    rst_n: SignalId,
    input: SignalId,
    bidir: SignalId,
    rails: Option<(SignalId, SignalId)>,
}

/// The chip-top counter.
pub struct ChipTop {
    powered_pins: bool,
    pins: Option<Pins>,
    /// `None` while the counter state is unknown.
    count: Option<u64>,
}

impl ChipTop {
    /// RTL view: no power pins.
    pub fn behavioral() -> Self {
        Self::new(false)
    }

    /// Netlist view with `VDD`/`VSS` pins.
    pub fn gate_level() -> Self {
        Self::new(true)
    }

    fn new(powered_pins: bool) -> Self {
        Self {
            powered_pins,
            pins: None,
            count: None,
        }
    }

    fn output(&self) -> LogicVec {
        match self.count {
            Some(count) => LogicVec::from_u64(count, BIDIR_WIDTH),
            None => LogicVec::all_x(BIDIR_WIDTH),
        }
    }
}

impl Model for ChipTop {
    fn elaborate(&mut self, ports: &mut PortBuilder<'_>) -> Result<(), SimError> {
        let clk = ports.declare(PortDecl::input("clk_PAD", 1))?;
        let rst_n = ports.declare(PortDecl::input("rst_n_PAD", 1))?;
        let input = ports.declare(PortDecl::input("input_PAD", INPUT_WIDTH))?;
        let bidir = ports.declare(PortDecl::inout("bidir_PAD", BIDIR_WIDTH))?;
        let rails = if self.powered_pins {
            Some((
                ports.declare(PortDecl::input("VDD", 1))?,
                ports.declare(PortDecl::input("VSS", 1))?,
            ))
        } else {
            None
        };
        self.pins = Some(Pins {
            clk,
            rst_n,
            input,
            bidir,
            rails,
        });
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut ModelContext<'_>) {
        let Some(pins) = self.pins else {
            return;
        };

        if let Some((vdd, vss)) = pins.rails {
            let powered =
                ctx.value(vdd).lsb() == Logic::One && ctx.value(vss).lsb() == Logic::Zero;
            if !powered {
                self.count = None;
                if ctx.value(pins.bidir).is_fully_defined() {
                    ctx.drive(pins.bidir, self.output());
                }
                return;
            }
        }

        if !ctx.rose(pins.clk) {
            return;
        }
        self.count = match ctx.value(pins.rst_n).lsb() {
            Logic::Zero => Some(0),
            Logic::One if ctx.value(pins.input).is_all_one() => {
                self.count.map(|c| (c + 1) & COUNT_MASK)
            }
            Logic::One => self.count,
            Logic::X | Logic::Z => None,
        };
        ctx.drive(pins.bidir, self.output());
    }
}
