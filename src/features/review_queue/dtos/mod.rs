mod queue_dto;

pub use queue_dto::{
    QueueItemResponseDto, QueueListQuery, QueueStatsDto, QueueStatusFilter,
    ResolveQueueItemDto, ResolveQueueItemResponseDto,
};
