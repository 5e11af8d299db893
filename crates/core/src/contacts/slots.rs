//! Address slot configuration.
//!
//! Each CRM location models extra addresses as folders of custom fields; the
//! folder (parent) ids below route a demultiplexed field group to a fixed
//! address position on the contact. This table is domain configuration, not
//! derived from data; new slots require a new table revision.

/// Slot id of the synthetic primary address, derived from top-level contact
/// fields rather than custom fields.
pub const PRIMARY_ADDRESS_SLOT: &str = "address_0";

/// One configured owner bucket for demultiplexed custom fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSlot {
    /// Remote parent folder id (or the synthetic primary slot id).
    pub slot_id: &'static str,
    /// Order of this address on the contact.
    pub position: i32,
}

/// Revision 1 of the slot table.
const ADDRESS_SLOTS_V1: &[AddressSlot] = &[
    AddressSlot {
        slot_id: PRIMARY_ADDRESS_SLOT,
        position: 0,
    },
    AddressSlot {
        slot_id: "QmYk134LkK2hownvL1sE",
        position: 1,
    },
    AddressSlot {
        slot_id: "6K2aY5ghsAeCNhNJBcTt",
        position: 2,
    },
    AddressSlot {
        slot_id: "4Vx8hTmhneL3aHhQOobV",
        position: 3,
    },
    AddressSlot {
        slot_id: "ou8hGYQTDuirxtCD2Bhs",
        position: 4,
    },
    AddressSlot {
        slot_id: "IVh5iKD6A7xB6JOCqocG",
        position: 5,
    },
    AddressSlot {
        slot_id: "vsrkHtczxuyyIg9CG8Op",
        position: 6,
    },
    AddressSlot {
        slot_id: "tt28EWemd1DyWpzqQKA3",
        position: 7,
    },
    AddressSlot {
        slot_id: "1ERLsUjWpMrUfHZx1oIr",
        position: 8,
    },
    AddressSlot {
        slot_id: "cCplI0tAY2q2MfCM5yco",
        position: 9,
    },
    AddressSlot {
        slot_id: "cdIPlyq0J77lx2GlU88G",
        position: 10,
    },
];

/// Lookup over the configured slot table.
#[derive(Debug, Clone, Copy)]
pub struct SlotIndex {
    slots: &'static [AddressSlot],
}

impl SlotIndex {
    /// The built-in slot table at its current revision.
    pub fn builtin() -> Self {
        Self {
            slots: ADDRESS_SLOTS_V1,
        }
    }

    pub fn position(&self, slot_id: &str) -> Option<i32> {
        self.slots
            .iter()
            .find(|slot| slot.slot_id == slot_id)
            .map(|slot| slot.position)
    }

    pub fn contains(&self, slot_id: &str) -> bool {
        self.position(slot_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressSlot> {
        self.slots.iter()
    }
}
