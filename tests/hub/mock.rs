//! Mock link, clock and delay for hub client testing

use iothub_lite::network::error::Error;
use iothub_lite::network::{Close, Connect, Connection, Read, Write};
use iothub_lite::time::{Clock, Delay};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Everything that happened on the mock link
#[derive(Debug, Default)]
pub struct LinkState {
    pub remotes: Vec<String>,
    pub refuse_connect: bool,
    pub writes: Vec<Vec<u8>>,
    pub fail_write_at: Option<usize>,
    pub replies: VecDeque<Vec<u8>>,
    /// Reply that only shows up once more than this many reads were made
    pub late_reply: Option<(usize, Vec<u8>)>,
    pub read_calls: usize,
    pub closes: usize,
}

impl LinkState {
    /// All bytes written, in order
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Written bytes as text
    pub fn written_text(&self) -> String {
        String::from_utf8(self.written()).unwrap()
    }
}

/// Connector handing out connections that share one [`LinkState`]
#[derive(Debug, Clone, Default)]
pub struct MockModem {
    pub state: Rc<RefCell<LinkState>>,
}

impl MockModem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply to be returned by the next non-empty read
    pub fn reply(&self, data: &[u8]) {
        self.state.borrow_mut().replies.push_back(data.to_vec());
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().remotes.len()
    }
}

pub struct MockLink {
    state: Rc<RefCell<LinkState>>,
}

impl Connect for MockModem {
    type Connection = MockLink;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.refuse_connect {
            return Err(Error::ConnectionRefused);
        }
        state.remotes.push(remote.to_string());
        Ok(MockLink {
            state: self.state.clone(),
        })
    }
}

impl Read for MockLink {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        state.read_calls += 1;
        let reply = match state.late_reply.take() {
            Some((after, reply)) if state.read_calls > after => Some(reply),
            pending => {
                state.late_reply = pending;
                state.replies.pop_front()
            }
        };
        match reply {
            Some(reply) => {
                let len = reply.len().min(buf.len());
                buf[..len].copy_from_slice(&reply[..len]);
                Ok(len)
            }
            None => Ok(0),
        }
    }
}

impl Write for MockLink {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_write_at == Some(state.writes.len()) {
            state.fail_write_at = None;
            return Err(Error::WriteError);
        }
        state.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockLink {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        // Anything still in flight is lost with the connection.
        state.replies.clear();
        state.late_reply = None;
        Ok(())
    }
}

impl Connection for MockLink {}

/// Clock the test can move forward
#[derive(Debug)]
pub struct MockClock {
    pub now: Cell<u64>,
    pub set: Cell<bool>,
}

impl MockClock {
    pub fn at(now: u64) -> Self {
        Self {
            now: Cell::new(now),
            set: Cell::new(true),
        }
    }

    pub fn unset() -> Self {
        Self {
            now: Cell::new(0),
            set: Cell::new(false),
        }
    }

    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for MockClock {
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn is_set(&self) -> bool {
        self.set.get()
    }
}

/// Delay that only records what it was asked to wait
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    pub waits: Rc<RefCell<Vec<u32>>>,
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits.borrow_mut().push(ms);
    }
}
