//! SA Lookup: the process-wide SA table and its three keyed indices
//!
//! Generalizes the teacher's `ikebuster::lib::scan`'s single `open:
//! HashMap<u64, Vec<Transform>>` correlation table (one index, one purpose)
//! into three indices over two SA kinds, exactly as spec §4.5/§5 describe.
//! Only the event-loop task is ever expected to mutate this (spec §5
//! "Shared resources").

use crate::sa::{ChildSa, IkeSa, SaRole, SaSerial};
use std::collections::HashMap;

/// The process-wide SA table: owns every [IkeSa] and [ChildSa], and keeps
/// the three lookup indices the spec names in lockstep with mutations
#[derive(Debug, Default)]
pub struct SaTable {
    next_serial: SaSerial,
    ike_sas: HashMap<SaSerial, IkeSa>,
    child_sas: HashMap<SaSerial, ChildSa>,
    by_spi_pair: HashMap<(u64, u64), SaSerial>,
    by_initiator_spi: HashMap<u64, SaSerial>,
    by_parent_msgid: HashMap<(SaSerial, u32), SaSerial>,
}

impl SaTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new IKE SA as responder or initiator, indexed by initiator SPI
    pub fn insert_ike_sa(
        &mut self,
        role: SaRole,
        initiator_spi: u64,
        connection: String,
    ) -> SaSerial {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.by_initiator_spi.insert(initiator_spi, serial);
        self.ike_sas
            .insert(serial, IkeSa::new(serial, role, initiator_spi, connection));
        serial
    }

    /// Record a newly learned responder SPI, completing lookup index 1
    /// (by SPI pair) once both SPIs are known
    pub fn learn_responder_spi(&mut self, serial: SaSerial, responder_spi: u64) {
        if let Some(sa) = self.ike_sas.get_mut(&serial) {
            sa.responder_spi = responder_spi;
            self.by_spi_pair
                .insert((sa.initiator_spi, responder_spi), serial);
        }
    }

    /// Lookup 1: by (initiator SPI, responder SPI)
    pub fn by_spi_pair(&self, initiator_spi: u64, responder_spi: u64) -> Option<&IkeSa> {
        self.by_spi_pair
            .get(&(initiator_spi, responder_spi))
            .and_then(|s| self.ike_sas.get(s))
    }

    /// Mutable variant of [Self::by_spi_pair]
    pub fn by_spi_pair_mut(&mut self, initiator_spi: u64, responder_spi: u64) -> Option<&mut IkeSa> {
        let serial = *self.by_spi_pair.get(&(initiator_spi, responder_spi))?;
        self.ike_sas.get_mut(&serial)
    }

    /// Lookup 2: by initiator SPI only, used while the responder SPI is
    /// still zero or unknown (SA_INIT request/response)
    pub fn by_initiator_spi(&self, initiator_spi: u64) -> Option<&IkeSa> {
        self.by_initiator_spi
            .get(&initiator_spi)
            .and_then(|s| self.ike_sas.get(s))
    }

    /// Mutable variant of [Self::by_initiator_spi]
    pub fn by_initiator_spi_mut(&mut self, initiator_spi: u64) -> Option<&mut IkeSa> {
        let serial = *self.by_initiator_spi.get(&initiator_spi)?;
        self.ike_sas.get_mut(&serial)
    }

    /// Fetch an IKE SA by its table handle
    pub fn ike_sa(&self, serial: SaSerial) -> Option<&IkeSa> {
        self.ike_sas.get(&serial)
    }

    /// Mutable variant of [Self::ike_sa]
    pub fn ike_sa_mut(&mut self, serial: SaSerial) -> Option<&mut IkeSa> {
        self.ike_sas.get_mut(&serial)
    }

    /// Borrow an [IkeSa] and, optionally, one of its [ChildSa]s mutably at
    /// once; the two live in separate maps so this does not alias, but a
    /// single `&mut self` method is needed to hand both out together (the
    /// handler interface, spec §6, takes exactly this shape)
    pub fn ike_and_child_mut(
        &mut self,
        ike: SaSerial,
        child: Option<SaSerial>,
    ) -> (Option<&mut IkeSa>, Option<&mut ChildSa>) {
        let ike_sa = self.ike_sas.get_mut(&ike);
        let child_sa = child.and_then(|c| self.child_sas.get_mut(&c));
        (ike_sa, child_sa)
    }

    /// Create a CHILD SA under `parent`, indexed by (parent, creating msgid)
    pub fn insert_child_sa(&mut self, parent: SaSerial, creating_msgid: u32, role: SaRole) -> SaSerial {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.by_parent_msgid.insert((parent, creating_msgid), serial);
        self.child_sas
            .insert(serial, ChildSa::new(serial, parent, creating_msgid, role));
        if let Some(ike_sa) = self.ike_sas.get_mut(&parent) {
            ike_sa.children.push(serial);
        }
        serial
    }

    /// Lookup 3: by (parent SA serial, msgid), to find the CHILD SA a
    /// CREATE_CHILD_SA response corresponds to
    pub fn child_by_msgid(&self, parent: SaSerial, msgid: u32) -> Option<&ChildSa> {
        self.by_parent_msgid
            .get(&(parent, msgid))
            .and_then(|s| self.child_sas.get(s))
    }

    /// Mutable variant of [Self::child_by_msgid]
    pub fn child_by_msgid_mut(&mut self, parent: SaSerial, msgid: u32) -> Option<&mut ChildSa> {
        let serial = *self.by_parent_msgid.get(&(parent, msgid))?;
        self.child_sas.get_mut(&serial)
    }

    /// Fetch a CHILD SA by its table handle
    pub fn child_sa(&self, serial: SaSerial) -> Option<&ChildSa> {
        self.child_sas.get(&serial)
    }

    /// Mutable variant of [Self::child_sa]
    pub fn child_sa_mut(&mut self, serial: SaSerial) -> Option<&mut ChildSa> {
        self.child_sas.get_mut(&serial)
    }

    /// Destroy an IKE SA and every CHILD SA still parented to it
    pub fn remove_ike_sa(&mut self, serial: SaSerial) -> Option<IkeSa> {
        let sa = self.ike_sas.remove(&serial)?;
        self.by_initiator_spi.remove(&sa.initiator_spi);
        self.by_spi_pair.remove(&(sa.initiator_spi, sa.responder_spi));
        for child in &sa.children {
            self.remove_child_sa(*child);
        }
        Some(sa)
    }

    /// Destroy a single CHILD SA
    pub fn remove_child_sa(&mut self, serial: SaSerial) -> Option<ChildSa> {
        let child = self.child_sas.remove(&serial)?;
        self.by_parent_msgid.remove(&(child.parent, child.creating_msgid));
        if let Some(parent) = self.ike_sas.get_mut(&child.parent) {
            parent.children.retain(|c| *c != serial);
        }
        Some(child)
    }

    /// Promote the CHILD SA produced by an IKE-rekey exchange into a new
    /// IKE SA, migrating every existing child of `old_serial` to it and
    /// retiring the old IKE SA's identity (its handle and message-id state
    /// are discarded; the caller is responsible for any final Delete
    /// notification on the old SPI pair before this is called)
    pub fn emancipate(
        &mut self,
        old_serial: SaSerial,
        new_initiator_spi: u64,
        new_responder_spi: u64,
    ) -> Option<SaSerial> {
        let old = self.ike_sas.remove(&old_serial)?;
        self.by_initiator_spi.remove(&old.initiator_spi);
        self.by_spi_pair.remove(&(old.initiator_spi, old.responder_spi));

        let new_serial = self.next_serial;
        self.next_serial += 1;
        let mut new_sa = IkeSa::new(new_serial, old.role, new_initiator_spi, old.connection.clone());
        new_sa.responder_spi = new_responder_spi;
        new_sa.state = match old.role {
            SaRole::Initiator => crate::sa::FiniteState::I3,
            SaRole::Responder => crate::sa::FiniteState::R2,
        };
        new_sa.skeyseed_available = true;
        new_sa.children = old.children.clone();

        for child_serial in &new_sa.children {
            if let Some(child) = self.child_sas.get_mut(child_serial) {
                child.parent = new_serial;
            }
        }

        self.by_initiator_spi.insert(new_initiator_spi, new_serial);
        self.by_spi_pair
            .insert((new_initiator_spi, new_responder_spi), new_serial);
        self.ike_sas.insert(new_serial, new_sa);
        Some(new_serial)
    }

    /// Count of IKE SAs currently in the given category, for DoS accounting
    pub fn count_in_category(&self, category: crate::sa::StateCategory) -> usize {
        self.ike_sas
            .values()
            .filter(|sa| sa.state.category() == category)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::FiniteState;

    #[test]
    fn spi_pair_lookup_resolves_after_learning_responder_spi() {
        let mut table = SaTable::new();
        let serial = table.insert_ike_sa(SaRole::Initiator, 0xaaaa, "default".into());
        assert!(table.by_spi_pair(0xaaaa, 0xbbbb).is_none());
        table.learn_responder_spi(serial, 0xbbbb);
        assert_eq!(table.by_spi_pair(0xaaaa, 0xbbbb).unwrap().serial, serial);
    }

    #[test]
    fn removing_ike_sa_cascades_to_children() {
        let mut table = SaTable::new();
        let parent = table.insert_ike_sa(SaRole::Responder, 1, "default".into());
        let child = table.insert_child_sa(parent, 1, SaRole::Responder);
        table.remove_ike_sa(parent);
        assert!(table.child_sa(child).is_none());
    }

    #[test]
    fn emancipation_migrates_children_and_resets_msgid_state() {
        let mut table = SaTable::new();
        let old = table.insert_ike_sa(SaRole::Responder, 10, "default".into());
        table.learn_responder_spi(old, 20);
        if let Some(sa) = table.ike_sa_mut(old) {
            sa.state = FiniteState::RekeyIkeR;
            sa.msgid.commit_request(5);
        }
        let child = table.insert_child_sa(old, 7, SaRole::Initiator);

        let new_serial = table.emancipate(old, 30, 40).unwrap();

        assert!(table.ike_sa(old).is_none());
        let new_sa = table.ike_sa(new_serial).unwrap();
        assert_eq!(new_sa.state, FiniteState::R2);
        assert_eq!(new_sa.msgid.lastrecv, None);
        assert_eq!(new_sa.msgid.nextuse, 0);
        assert_eq!(table.child_sa(child).unwrap().parent, new_serial);
        assert_eq!(table.by_spi_pair(30, 40).unwrap().serial, new_serial);
    }
}
