//! Squadron channel-category engine.
//!
//! Components:
//! - [`CategoryAllocator`]: overflow-aware category lookup and creation
//! - [`ChannelSorter`]: alphabetic reordering inside categories
//! - [`SquadronSampler`]: uniform random selection of squadron channels
//! - [`ArchiveMover`]: archiving with leader notification
//! - [`SquadronCreator`] and [`TickRemover`]: channel creation and marker cleanup
//!
//! All guild state is read and written through [`crate::directory`].

pub mod allocator;
pub mod archive;
pub mod creator;
pub mod error;
pub mod naming;
pub mod sampler;
pub mod selector;
pub mod sorter;
pub mod ticks;

pub use allocator::{Allocation, CategoryAllocator, CategoryKind, Placement, CATEGORY_CAPACITY};
pub use archive::{ArchiveMover, ArchiveReport};
pub use creator::{CreateReport, CreateRequest, SquadronCreator};
pub use error::SquadronError;
pub use sampler::SquadronSampler;
pub use selector::CategorySelector;
pub use sorter::{ChannelSorter, PositionUpdate};
pub use ticks::TickRemover;

/// Every squadron component, sharing one allocator configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquadronEngine {
    pub allocator: CategoryAllocator,
    pub sorter: ChannelSorter,
    pub sampler: SquadronSampler,
    pub archiver: ArchiveMover,
    pub creator: SquadronCreator,
    pub ticks: TickRemover,
}

impl SquadronEngine {
    /// Engine whose categories hold at most `capacity` channels.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        let allocator = CategoryAllocator::new(capacity);
        Self {
            allocator,
            sorter: ChannelSorter,
            sampler: SquadronSampler,
            archiver: ArchiveMover::new(allocator),
            creator: SquadronCreator::new(allocator),
            ticks: TickRemover,
        }
    }
}
