use crate::types::{ContainerRecord, InfoBase, NodeInfo};

pub fn build(node_info: NodeInfo, container_info: Vec<ContainerRecord>) -> InfoBase {
    InfoBase {
        node_info,
        container_info,
    }
}
