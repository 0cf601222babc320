//! Cellular environment seam.

/// One cell observed by the modem, serving or neighboring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    pub cell_id: u32,
    pub area_code: u16,
    /// Received signal strength.
    pub rssi_dbm: i32,
    /// True for the cell the modem is currently registered on.
    pub registered: bool,
}

/// A neighboring cell as reported by the legacy query. Carries less detail
/// than [`CellInfo`]; in particular the registered flag does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborCellInfo {
    pub cell_id: u32,
    pub area_code: u16,
    pub rssi_dbm: i32,
}

/// Access to the modem's view of the cellular environment.
///
/// Both queries are snapshots; the platform may answer `None` when the
/// modem has nothing to report, which callers treat the same as an empty
/// list. Which query applies depends on the platform level, decided by the
/// caller, not here.
pub trait CellInfoSource: Send + Sync {
    /// Unified query: all cells the modem sees, registered cell included.
    fn current_cell_info(&self) -> Option<Vec<CellInfo>>;

    /// Legacy query: neighboring cells only.
    fn neighboring_cell_info(&self) -> Option<Vec<NeighborCellInfo>>;
}
