use futures::stream::{self, BoxStream, StreamExt};

use crate::linked_data::{Cid, LinkedData};

use super::{NodeStore, ResolveStep, StoreError};

/// Generic lazy resolver over any [`NodeStore`].
///
/// Loads one block per step and walks as many segments as that block
///  holds. Stopping on a link yields the link with the rest of the path,
///  and the next step continues inside the linked block. A path that
///  ends exactly on a link still follows it, so the last step carries
///  the linked node rather than the link.
pub fn resolve_steps<'a, S>(
    store: &'a S,
    cid: Cid,
    path: &str,
) -> BoxStream<'a, Result<ResolveStep, StoreError>>
where
    S: NodeStore + ?Sized,
{
    let segments = split_path(path);

    stream::try_unfold(Some((cid, segments)), move |next| async move {
        let Some((cid, segments)) = next else {
            return Ok(None);
        };

        tracing::trace!("resolving {:?} in {}", segments, cid);
        let node = store.get(&cid).await?;
        let (value, remaining) = resolve_in_node(node, &segments)?;

        let follow = match &value {
            LinkedData::Link(link) => Some((*link, remaining.clone())),
            _ => None,
        };
        let step = ResolveStep {
            remainder_path: remaining.join("/"),
            value,
        };

        Ok::<_, StoreError>(Some((step, follow)))
    })
    .boxed()
}

/// Walk `segments` inside a single decoded node.
///
/// Returns the value reached together with the segments that were not
///  consumed. Segments are only left over when a link is reached, since
///  links have to be loaded from the store before going further.
pub fn resolve_in_node(
    node: LinkedData,
    segments: &[String],
) -> Result<(LinkedData, Vec<String>), StoreError> {
    let mut value = node;

    for (idx, segment) in segments.iter().enumerate() {
        if matches!(value, LinkedData::Link(_)) {
            return Ok((value, segments[idx..].to_vec()));
        }

        value = match value {
            LinkedData::Map(mut map) => map.remove(segment),
            LinkedData::List(mut list) => segment
                .parse::<usize>()
                .ok()
                .filter(|index| *index < list.len())
                .map(|index| list.swap_remove(index)),
            _ => None,
        }
        .ok_or_else(|| StoreError::KeyNotFound {
            key: segment.clone(),
        })?;
    }

    Ok((value, Vec::new()))
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
