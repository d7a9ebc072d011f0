//! Message-ID Tracker: per-SA request/response windowing and retransmit detection

/// The four Message-ID counters the spec's data model assigns to every IKE SA
///
/// `None` represents the "invalid" sequence number the spec describes for a
/// counter that hasn't been used yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageIdState {
    /// Highest msgid whose response we have accepted
    pub lastack: Option<u32>,
    /// Next msgid we will mint for an outbound request
    pub nextuse: u32,
    /// Highest msgid we have received as a request
    pub lastrecv: Option<u32>,
    /// Highest msgid we have answered
    pub lastreplied: Option<u32>,
}

/// What to do with an incoming request, decided purely from its Message ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Older than anything we've seen, or a retransmit of a request we have
    /// not replied to yet; drop silently
    Drop,
    /// A retransmit of the last request we *did* reply to; re-emit the cached response
    Retransmit,
    /// A new request; dispatch it, then call [MessageIdState::commit_request] on success
    Fresh,
}

/// What to do with an incoming response, decided purely from its Message ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Already acknowledged or older; drop
    OldDuplicate,
    /// Higher than any request we have sent; drop
    Unsolicited,
    /// Matches an outstanding request; process it
    Fresh,
}

impl MessageIdState {
    /// Classify an incoming request carrying Message ID `m`
    ///
    /// `incoming_fragment_number` is `Some(n)` when the request's first
    /// payload is an SKF fragment; a retransmitted request's cached response
    /// is only re-emitted once fragment 1 of the retransmission has arrived,
    /// matching every other response-release path in this tracker.
    pub fn on_request(&self, m: u32, incoming_fragment_number: Option<u16>) -> RequestOutcome {
        let Some(lastrecv) = self.lastrecv else {
            return RequestOutcome::Fresh;
        };
        if m < lastrecv {
            return RequestOutcome::Drop;
        }
        if m > lastrecv {
            return RequestOutcome::Fresh;
        }
        let replied = self.lastreplied.is_some_and(|r| r >= lastrecv);
        if !replied {
            return RequestOutcome::Drop;
        }
        match incoming_fragment_number {
            Some(n) if n != 1 => RequestOutcome::Drop,
            _ => RequestOutcome::Retransmit,
        }
    }

    /// Classify an incoming response carrying Message ID `m`
    pub fn on_response(&self, m: u32) -> ResponseOutcome {
        if let Some(lastack) = self.lastack {
            if m <= lastack {
                return ResponseOutcome::OldDuplicate;
            }
        }
        if m >= self.nextuse {
            return ResponseOutcome::Unsolicited;
        }
        ResponseOutcome::Fresh
    }

    /// Record that request `m` was accepted and dispatched to the handler
    pub fn commit_request(&mut self, m: u32) {
        self.lastrecv = Some(m);
    }

    /// Record that we have sent (and cached) a response to request `m`
    pub fn commit_reply(&mut self, m: u32) {
        self.lastreplied = Some(m);
    }

    /// Record that response `m` was accepted and processed
    pub fn commit_response(&mut self, m: u32) {
        self.lastack = Some(m);
    }

    /// Mint the next outbound Message ID, advancing `nextuse`
    pub fn mint(&mut self) -> u32 {
        let m = self.nextuse;
        self.nextuse += 1;
        m
    }

    /// Whether the request window has room for another outbound request
    pub fn window_has_space(&self, window_size: u32) -> bool {
        let lastack = self.lastack.map(|a| a as i64).unwrap_or(-1);
        let outstanding = self.nextuse as i64 - lastack - 1;
        outstanding < window_size as i64
    }

    /// Check the invariants the spec asserts hold for every reachable state
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        if let Some(lastack) = self.lastack {
            debug_assert!(lastack <= self.nextuse.saturating_sub(1));
        }
        if let (Some(lastreplied), Some(lastrecv)) = (self.lastreplied, self.lastrecv) {
            debug_assert!(lastreplied <= lastrecv);
        }
    }
}
