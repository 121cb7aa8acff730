//! In-memory display backend for tests
//!
//! Records every request and simulates the input and bounding regions
//! pixel by pixel, which keeps it practical only for small screens.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::io::{Read, Write};
use std::os::unix::io::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;

use super::events::{DisplayEvent, ShapeKind, ShapeOp, ShapeStep, WindowId, WindowSpec};
use super::traits::{DisplayBackend, DisplayError, DisplayResult};
use crate::screen::{Point, Rect, Screen};

/// A request observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateWindow(WindowSpec),
    AtomProperty(String, Vec<String>),
    CardinalProperty(String, u32),
    TextProperty(String, String, String),
    Raise(WindowId),
    Shape(ShapeStep),
    Map(WindowId),
    Unmap(WindowId),
    Warp(Point),
    Flush,
}

pub struct MockBackend {
    screen: Screen,
    requests: RefCell<Vec<Request>>,
    events: RefCell<VecDeque<DisplayResult<DisplayEvent>>>,
    input_region: RefCell<HashSet<Point>>,
    bounding_region: RefCell<HashSet<Point>>,
    next_window: Cell<WindowId>,
    /// Property names whose requests fail
    failing_properties: RefCell<HashSet<String>>,
    fail_shape: Cell<bool>,
    /// Written by `wake`; the event fd is readable only after that.
    peer: UnixStream,
    socket: UnixStream,
}

impl MockBackend {
    pub fn new(width: u32, height: u32) -> Self {
        let (socket, peer) = UnixStream::pair().expect("socket pair");
        socket.set_nonblocking(true).expect("non-blocking socket");
        Self {
            screen: Screen::new(0x100, width, height),
            requests: RefCell::new(Vec::new()),
            events: RefCell::new(VecDeque::new()),
            input_region: RefCell::new(HashSet::new()),
            bounding_region: RefCell::new(HashSet::new()),
            next_window: Cell::new(0x0400_0001),
            failing_properties: RefCell::new(HashSet::new()),
            fail_shape: Cell::new(false),
            peer,
            socket,
        }
    }

    pub fn push_event(&self, event: DisplayEvent) {
        self.events.borrow_mut().push_back(Ok(event));
    }

    pub fn push_entry(&self, window: WindowId, x: i32, y: i32) {
        self.push_event(DisplayEvent::PointerEntry(super::PointerEntry {
            window,
            position: Point::new(x, y),
        }));
    }

    /// Make the event fd readable, as the server does when it sends events
    pub fn wake(&self) {
        (&self.peer).write_all(&[1]).expect("wake event fd");
    }

    /// Queue a connection failure, as if the server went away
    pub fn push_disconnect(&self) {
        self.events.borrow_mut().push_back(Err(DisplayError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "server closed the connection",
        ))));
    }

    pub fn fail_property(&self, property: &str) {
        self.failing_properties
            .borrow_mut()
            .insert(property.to_string());
    }

    pub fn fail_shape(&self) {
        self.fail_shape.set(true);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn warps(&self) -> Vec<Point> {
        self.requests
            .borrow()
            .iter()
            .filter_map(|request| match request {
                Request::Warp(point) => Some(*point),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matcher: impl Fn(&Request) -> bool) -> usize {
        self.requests.borrow().iter().filter(|r| matcher(*r)).count()
    }

    pub fn input_region(&self) -> HashSet<Point> {
        self.input_region.borrow().clone()
    }

    pub fn bounding_region(&self) -> HashSet<Point> {
        self.bounding_region.borrow().clone()
    }

    fn record(&self, request: Request) {
        self.requests.borrow_mut().push(request);
    }

    fn check_property(&self, property: &str) -> DisplayResult<()> {
        if self.failing_properties.borrow().contains(property) {
            return Err(DisplayError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("BadAtom on {}", property),
            )));
        }
        Ok(())
    }
}

fn points(rect: Rect) -> impl Iterator<Item = Point> {
    (rect.y..rect.y + rect.height as i32)
        .flat_map(move |y| (rect.x..rect.x + rect.width as i32).map(move |x| Point::new(x, y)))
}

impl DisplayBackend for MockBackend {
    fn screen(&self) -> Screen {
        self.screen
    }

    fn event_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }

    fn create_window(&self, spec: &WindowSpec) -> DisplayResult<WindowId> {
        let window = self.next_window.get();
        self.next_window.set(window + 1);
        self.record(Request::CreateWindow(spec.clone()));

        // A new window accepts input over its whole area.
        let local = Rect::new(0, 0, spec.geometry.width, spec.geometry.height);
        *self.input_region.borrow_mut() = points(local).collect();
        *self.bounding_region.borrow_mut() = points(local).collect();
        Ok(window)
    }

    fn set_atom_property(
        &self,
        _window: WindowId,
        property: &str,
        atoms: &[&str],
    ) -> DisplayResult<()> {
        self.check_property(property)?;
        self.record(Request::AtomProperty(
            property.to_string(),
            atoms.iter().map(|a| a.to_string()).collect(),
        ));
        Ok(())
    }

    fn set_cardinal_property(
        &self,
        _window: WindowId,
        property: &str,
        value: u32,
    ) -> DisplayResult<()> {
        self.check_property(property)?;
        self.record(Request::CardinalProperty(property.to_string(), value));
        Ok(())
    }

    fn set_text_property(
        &self,
        _window: WindowId,
        property: &str,
        encoding: &str,
        value: &str,
    ) -> DisplayResult<()> {
        self.check_property(property)?;
        self.record(Request::TextProperty(
            property.to_string(),
            encoding.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    fn raise_window(&self, window: WindowId) -> DisplayResult<()> {
        self.record(Request::Raise(window));
        Ok(())
    }

    fn apply_shape(&self, _window: WindowId, step: &ShapeStep) -> DisplayResult<()> {
        if self.fail_shape.get() {
            return Err(DisplayError::MissingExtension("SHAPE"));
        }
        self.record(Request::Shape(*step));

        let mut region = match step.kind {
            ShapeKind::Input => self.input_region.borrow_mut(),
            ShapeKind::Bounding => self.bounding_region.borrow_mut(),
        };
        match step.op {
            ShapeOp::Set => *region = points(step.rect).collect(),
            ShapeOp::Subtract => {
                for point in points(step.rect) {
                    region.remove(&point);
                }
            }
        }
        Ok(())
    }

    fn map_window(&self, window: WindowId) -> DisplayResult<()> {
        self.record(Request::Map(window));
        Ok(())
    }

    fn unmap_window(&self, window: WindowId) -> DisplayResult<()> {
        self.record(Request::Unmap(window));
        Ok(())
    }

    fn warp_pointer(&self, target: Point) -> DisplayResult<()> {
        self.record(Request::Warp(target));
        Ok(())
    }

    fn flush(&self) -> DisplayResult<()> {
        self.record(Request::Flush);
        Ok(())
    }

    fn poll_event(&self) -> DisplayResult<Option<DisplayEvent>> {
        // Consume wake bytes so the fd only turns readable again on the next wake.
        let mut buf = [0u8; 64];
        while matches!((&self.socket).read(&mut buf), Ok(n) if n > 0) {}

        self.events.borrow_mut().pop_front().transpose()
    }
}
