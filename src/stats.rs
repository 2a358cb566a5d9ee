use std::io::{self, Write};

/// Counters for one run of probes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStatistics {
    pub sent: u32,
    pub received: u32,
    pub total_time_ms: f64,
}

impl RunStatistics {
    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_reply(&mut self, rtt_ms: f64) {
        self.received += 1;
        self.total_time_ms += rtt_ms;
    }

    /// Mean RTT over the answered probes, `None` if nothing came back.
    pub fn average_ms(&self) -> Option<f64> {
        if self.received == 0 {
            return None;
        }
        Some(self.total_time_ms / f64::from(self.received))
    }

    /// Percentage of sent probes left unanswered, `None` if nothing was sent.
    pub fn packet_loss(&self) -> Option<f64> {
        if self.sent == 0 {
            return None;
        }
        let lost = self.sent.saturating_sub(self.received);
        Some(f64::from(lost) / f64::from(self.sent) * 100.0)
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{} packets transmitted, {} packets received.",
            self.sent, self.received
        )?;
        match (self.average_ms(), self.packet_loss()) {
            (Some(average), Some(loss)) => {
                writeln!(out, "Average round-trip time: {:.4}ms", average)?;
                writeln!(out, "Packet loss: {:.2}%", loss)
            }
            _ => writeln!(out, "No response received."),
        }
    }
}
