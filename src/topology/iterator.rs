use crate::core::Result;

use super::node::NodeHandle;

/// Flatten the subtree under `root` into a pre-order list of handles.
///
/// The root and every nested cluster are included ahead of their children, so
/// visitors see cluster validators and cluster costs as well as leaf nodes.
pub fn flatten(root: &NodeHandle) -> Result<Vec<NodeHandle>> {
    let mut ordered = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(handle) = stack.pop() {
        {
            let node = handle.read()?;
            for child in node.children().iter().rev() {
                stack.push(child.clone());
            }
        }
        ordered.push(handle);
    }
    Ok(ordered)
}
