//! Terminal surface abstraction.
//!
//! The session layer only needs a byte sink with a size. [`VtSurface`] backs
//! it with a `vt100` screen that the front end draws from.

/// Byte sink for one pane's terminal output.
pub trait TerminalSurface {
    /// Feed remote output (or a local notice) into the surface.
    fn write(&mut self, data: &[u8]);
    /// Resize the surface to `cols` x `rows`.
    fn fit(&mut self, cols: u16, rows: u16);
    /// Current `(cols, rows)`.
    fn size(&self) -> (u16, u16);
}

/// `vt100`-backed surface
pub struct VtSurface {
    parser: vt100::Parser,
}

impl VtSurface {
    pub fn new(cols: u16, rows: u16, scrollback: usize) -> Self {
        Self {
            parser: vt100::Parser::new(rows.max(1), cols.max(1), scrollback),
        }
    }

    pub fn screen(&self) -> &vt100::Screen {
        self.parser.screen()
    }
}

impl TerminalSurface for VtSurface {
    fn write(&mut self, data: &[u8]) {
        self.parser.process(data);
    }

    fn fit(&mut self, cols: u16, rows: u16) {
        self.parser.set_size(rows.max(1), cols.max(1));
    }

    fn size(&self) -> (u16, u16) {
        let (rows, cols) = self.parser.screen().size();
        (cols, rows)
    }
}
