//! X11 display backend
//!
//! Talks to the X server through x11rb's pure-Rust connection.
//!
//! Requirements:
//! - A reachable X server (`$DISPLAY` or an explicit display name)
//! - The SHAPE extension, version 1.1 or later, for input shaping

use std::os::unix::io::{AsFd, BorrowedFd};

use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeGCAux, ConfigureWindowAux, ConnectionExt as _, CreateGCAux,
    CreateWindowAux, EventMask, PropMode, Rectangle, StackMode,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::events::{
    DisplayEvent, PointerEntry, ShapeKind, ShapeOp, ShapeStep, WindowClass, WindowId, WindowSpec,
};
use super::traits::{DisplayBackend, DisplayError, DisplayResult};
use crate::screen::{Point, Rect, Screen};

/// Depth of the scratch pixmaps used as shape masks
const MASK_DEPTH: u8 = 1;

/// X11 backend over a single `RustConnection`
pub struct X11Backend {
    conn: RustConnection,
    screen: Screen,
    white_pixel: u32,
}

impl X11Backend {
    /// Connect to the named display, or `$DISPLAY` when `None`
    pub fn connect(display_name: Option<&str>) -> DisplayResult<Self> {
        let (conn, screen_num) = x11rb::connect(display_name)?;

        let (screen, white_pixel) = {
            let root = conn
                .setup()
                .roots
                .get(screen_num)
                .ok_or(DisplayError::NoScreen(screen_num))?;
            (
                Screen::new(
                    root.root,
                    u32::from(root.width_in_pixels),
                    u32::from(root.height_in_pixels),
                ),
                root.white_pixel,
            )
        };

        if conn
            .extension_information(shape::X11_EXTENSION_NAME)?
            .is_none()
        {
            return Err(DisplayError::MissingExtension(shape::X11_EXTENSION_NAME));
        }

        tracing::debug!(
            "Connected to X server, screen {}, root window {:#x}",
            screen_num,
            screen.root
        );

        Ok(Self {
            conn,
            screen,
            white_pixel,
        })
    }

    fn intern(&self, name: &str) -> DisplayResult<xproto::Atom> {
        Ok(self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
    }

    /// Build a screen-sized 1-bit mask with only `rect` set and apply it
    fn shape_with_mask(
        &self,
        window: WindowId,
        op: shape::SO,
        kind: shape::SK,
        rect: Rect,
    ) -> DisplayResult<()> {
        let bounds = self.screen.bounds();
        let pixmap = self.conn.generate_id()?;
        let gc = self.conn.generate_id()?;

        self.conn.create_pixmap(
            MASK_DEPTH,
            pixmap,
            self.screen.root,
            to_u16(bounds.width)?,
            to_u16(bounds.height)?,
        )?;
        self.conn
            .create_gc(gc, pixmap, &CreateGCAux::new().foreground(0))?;

        // Fresh pixmap contents are undefined; clear before drawing the mask.
        let result = self.draw_mask(pixmap, gc, bounds, rect).and_then(|()| {
            self.conn
                .shape_mask(op, kind, window, 0, 0, pixmap)?
                .check()
                .map_err(DisplayError::from)
        });

        self.conn.free_gc(gc)?;
        self.conn.free_pixmap(pixmap)?;
        result
    }

    fn draw_mask(
        &self,
        pixmap: xproto::Pixmap,
        gc: xproto::Gcontext,
        bounds: Rect,
        rect: Rect,
    ) -> DisplayResult<()> {
        self.conn
            .poly_fill_rectangle(pixmap, gc, &[to_rectangle(bounds)?])?;
        self.conn
            .change_gc(gc, &ChangeGCAux::new().foreground(1))?;
        self.conn
            .poly_fill_rectangle(pixmap, gc, &[to_rectangle(rect)?])?;
        Ok(())
    }
}

impl DisplayBackend for X11Backend {
    fn screen(&self) -> Screen {
        self.screen
    }

    fn event_fd(&self) -> BorrowedFd<'_> {
        self.conn.stream().as_fd()
    }

    fn create_window(&self, spec: &WindowSpec) -> DisplayResult<WindowId> {
        let window = self.conn.generate_id()?;
        let (class, aux) = match spec.class {
            WindowClass::InputOnly => (
                xproto::WindowClass::INPUT_ONLY,
                CreateWindowAux::new().event_mask(EventMask::ENTER_WINDOW),
            ),
            WindowClass::InputOutput => (
                xproto::WindowClass::INPUT_OUTPUT,
                CreateWindowAux::new()
                    .background_pixel(self.white_pixel)
                    .event_mask(EventMask::ENTER_WINDOW),
            ),
        };

        let geometry = spec.geometry;
        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                spec.parent,
                to_i16(geometry.x)?,
                to_i16(geometry.y)?,
                to_u16(geometry.width)?,
                to_u16(geometry.height)?,
                0,
                class,
                x11rb::COPY_FROM_PARENT,
                &aux,
            )?
            .check()?;

        Ok(window)
    }

    fn set_atom_property(
        &self,
        window: WindowId,
        property: &str,
        atoms: &[&str],
    ) -> DisplayResult<()> {
        let property = self.intern(property)?;
        let values = atoms
            .iter()
            .map(|name| self.intern(name))
            .collect::<DisplayResult<Vec<_>>>()?;

        self.conn
            .change_property32(PropMode::REPLACE, window, property, AtomEnum::ATOM, &values)?
            .check()?;
        Ok(())
    }

    fn set_cardinal_property(
        &self,
        window: WindowId,
        property: &str,
        value: u32,
    ) -> DisplayResult<()> {
        let property = self.intern(property)?;
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                property,
                AtomEnum::CARDINAL,
                &[value],
            )?
            .check()?;
        Ok(())
    }

    fn set_text_property(
        &self,
        window: WindowId,
        property: &str,
        encoding: &str,
        value: &str,
    ) -> DisplayResult<()> {
        let property = self.intern(property)?;
        let encoding = self.intern(encoding)?;
        self.conn
            .change_property8(PropMode::REPLACE, window, property, encoding, value.as_bytes())?
            .check()?;
        Ok(())
    }

    fn raise_window(&self, window: WindowId) -> DisplayResult<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?
            .check()?;
        Ok(())
    }

    fn apply_shape(&self, window: WindowId, step: &ShapeStep) -> DisplayResult<()> {
        let op = match step.op {
            ShapeOp::Set => shape::SO::SET,
            ShapeOp::Subtract => shape::SO::SUBTRACT,
        };
        let kind = match step.kind {
            ShapeKind::Input => shape::SK::INPUT,
            ShapeKind::Bounding => shape::SK::BOUNDING,
        };
        self.shape_with_mask(window, op, kind, step.rect)
    }

    fn map_window(&self, window: WindowId) -> DisplayResult<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: WindowId) -> DisplayResult<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn warp_pointer(&self, target: Point) -> DisplayResult<()> {
        self.conn.warp_pointer(
            x11rb::NONE,
            self.screen.root,
            0,
            0,
            0,
            0,
            to_i16(target.x)?,
            to_i16(target.y)?,
        )?;
        Ok(())
    }

    fn flush(&self) -> DisplayResult<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn poll_event(&self) -> DisplayResult<Option<DisplayEvent>> {
        let Some(event) = self.conn.poll_for_event()? else {
            return Ok(None);
        };

        let event = match event {
            Event::EnterNotify(entry) => DisplayEvent::PointerEntry(PointerEntry {
                window: entry.event,
                position: Point::new(i32::from(entry.event_x), i32::from(entry.event_y)),
            }),
            Event::Error(error) => DisplayEvent::ProtocolError(format!(
                "{:?} (major opcode {}, sequence {})",
                error.error_kind, error.major_opcode, error.sequence
            )),
            _ => DisplayEvent::Other,
        };
        Ok(Some(event))
    }
}

fn to_i16(value: i32) -> DisplayResult<i16> {
    i16::try_from(value).map_err(|_| DisplayError::OutOfRange(i64::from(value)))
}

fn to_u16(value: u32) -> DisplayResult<u16> {
    u16::try_from(value).map_err(|_| DisplayError::OutOfRange(i64::from(value)))
}

fn to_rectangle(rect: Rect) -> DisplayResult<Rectangle> {
    Ok(Rectangle {
        x: to_i16(rect.x)?,
        y: to_i16(rect.y)?,
        width: to_u16(rect.width)?,
        height: to_u16(rect.height)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_conversion() {
        assert_eq!(to_i16(1919).unwrap(), 1919);
        assert!(matches!(to_i16(40_000), Err(DisplayError::OutOfRange(40_000))));
        assert!(to_u16(70_000).is_err());
    }

    #[test]
    fn test_to_rectangle() {
        let rect = to_rectangle(Rect::new(1, 1, 1918, 1078)).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (1, 1, 1918, 1078));
    }
}
