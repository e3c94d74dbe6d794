//! Pick an alternate channel of a race by a case-sensitive text query.

use crate::models::{ChannelDescriptor, ChannelType, ContentInfo, ContentKind};

/// First channel, in list order, with a search field containing `query`.
///
/// Fields are checked in the order given by
/// [`ChannelDescriptor::search_fields`]; the match is case-sensitive.
pub fn find_channel<'a>(
    channels: &'a [ChannelDescriptor],
    query: &str,
) -> Option<&'a ChannelDescriptor> {
    channels.iter().find(|channel| {
        channel
            .search_fields()
            .iter()
            .any(|field| field.contains(query))
    })
}

/// Channel query to use for `content`: the requested one, or `default_channel`
/// for races when nothing was requested. Non-race content has no channels.
pub fn effective_channel_query<'a>(
    content: &ContentInfo,
    requested: Option<&'a str>,
    default_channel: &'a str,
) -> Option<&'a str> {
    match content.kind {
        ContentKind::Race { .. } => Some(requested.unwrap_or(default_channel)),
        ContentKind::NonRace => None,
    }
}

/// One human readable line per channel, as shown by `--channel-list`
pub fn describe_channel(channel: &ChannelDescriptor) -> String {
    match (channel.driver_full_name(), channel.racing_number) {
        (Some(driver), number) if channel.kind == ChannelType::Obc => format!(
            "{:<30} {:<14} tla: {}",
            format!("name: {driver}"),
            format!("number: {}", number.map(|n| n.to_string()).unwrap_or_default()),
            channel.title
        ),
        _ => format!("name: {}", channel.title),
    }
}
