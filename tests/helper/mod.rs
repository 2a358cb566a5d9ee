#![allow(dead_code)]

use rping::common::{EchoRequest, ICMP_ECHO_REPLY, IPV4_HEADER_LEN};
use rping::IcmpSocket;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// What the next wait on a scripted socket sees.
#[derive(Debug, Clone)]
pub enum Step {
    /// The last request comes back as an echo reply after the delay.
    Echo(Duration),
    /// An echo reply for another identifier arrives after the delay.
    Foreign(u16, Duration),
    /// Nothing arrives before the wait runs out.
    Silence,
    /// The wait fails with this error.
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
pub struct Record {
    pub opened: usize,
    pub closed: usize,
    pub sent: Vec<(Vec<u8>, Ipv4Addr)>,
    pub waits: Vec<Duration>,
}

pub struct ScriptedSocket {
    script: Rc<RefCell<VecDeque<Step>>>,
    record: Rc<RefCell<Record>>,
    pending: Option<Vec<u8>>,
}

impl ScriptedSocket {
    fn reply_to_last(&self, identifier: Option<u16>) -> Vec<u8> {
        let record = self.record.borrow();
        let (packet, _) = record.sent.last().expect("reply scripted before any send");
        let mut reply = EchoRequest::decode(packet).expect("sent packet decodes");
        reply.header.icmp_type = ICMP_ECHO_REPLY;
        if let Some(identifier) = identifier {
            reply.header.icmp_identifier = identifier;
        }
        let mut datagram = vec![0x45; IPV4_HEADER_LEN];
        datagram.extend(reply.encode().unwrap());
        datagram
    }

    fn arrive_after(&mut self, delay: Duration, timeout: Duration, datagram: Vec<u8>) -> bool {
        if delay >= timeout {
            thread::sleep(timeout);
            return false;
        }
        thread::sleep(delay);
        self.pending = Some(datagram);
        true
    }
}

impl IcmpSocket for ScriptedSocket {
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()> {
        self.record.borrow_mut().sent.push((packet.to_vec(), destination));
        Ok(())
    }

    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.record.borrow_mut().waits.push(timeout);
        let step = self.script.borrow_mut().pop_front().unwrap_or(Step::Silence);
        match step {
            Step::Echo(delay) => {
                let datagram = self.reply_to_last(None);
                Ok(self.arrive_after(delay, timeout, datagram))
            }
            Step::Foreign(identifier, delay) => {
                let datagram = self.reply_to_last(Some(identifier));
                Ok(self.arrive_after(delay, timeout, datagram))
            }
            Step::Silence => {
                thread::sleep(timeout);
                Ok(false)
            }
            Step::Fail(kind) => Err(io::Error::from(kind)),
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let datagram = self.pending.take().expect("recv without a readable wait");
        buf[..datagram.len()].copy_from_slice(&datagram);
        Ok(datagram.len())
    }
}

impl Drop for ScriptedSocket {
    fn drop(&mut self) {
        self.record.borrow_mut().closed += 1;
    }
}

/// Shared script and record for every socket a prober opens.
pub struct Harness {
    pub script: Rc<RefCell<VecDeque<Step>>>,
    pub record: Rc<RefCell<Record>>,
}

impl Harness {
    pub fn new(steps: Vec<Step>) -> Self {
        Harness {
            script: Rc::new(RefCell::new(steps.into())),
            record: Rc::new(RefCell::new(Record::default())),
        }
    }

    pub fn opener(&self) -> impl Fn() -> io::Result<ScriptedSocket> {
        let script = Rc::clone(&self.script);
        let record = Rc::clone(&self.record);
        move || {
            record.borrow_mut().opened += 1;
            Ok(ScriptedSocket {
                script: Rc::clone(&script),
                record: Rc::clone(&record),
                pending: None,
            })
        }
    }
}

pub fn denied() -> io::Result<ScriptedSocket> {
    Err(io::Error::new(io::ErrorKind::PermissionDenied, "Operation not permitted"))
}

pub fn localhost(_: &str) -> Option<Ipv4Addr> {
    Some(Ipv4Addr::LOCALHOST)
}

pub fn unresolvable(_: &str) -> Option<Ipv4Addr> {
    None
}

pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
