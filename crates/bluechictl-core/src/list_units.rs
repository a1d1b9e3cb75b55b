//! `list-units`: query the controller or a single node and render the result
//!
//! Every operation owns exactly one [`UnitList`] for its duration; it is
//! released when the operation returns, whether the fetch succeeded or not.

use crate::constants::{BC_OBJECT_PATH, CONTROLLER_INTERFACE, NODE_INTERFACE, NODE_OBJECT_PATH_PREFIX};
use crate::fetch::{Endpoint, UnitShape, fetch_unit_list};
use crate::unit_list::UnitList;
use bluechi_rs::{BluechiError, Bus, assemble_object_path_string};

/// Endpoint listing the units of every node through the controller
pub fn controller_endpoint() -> Endpoint {
    Endpoint::new(BC_OBJECT_PATH, CONTROLLER_INTERFACE, UnitShape::NodeAndUnit)
}

/// Endpoint listing the units of a single node
pub fn node_endpoint(node_name: &str) -> Result<Endpoint, BluechiError> {
    let object_path = assemble_object_path_string(NODE_OBJECT_PATH_PREFIX, node_name)?;
    Ok(Endpoint::new(object_path, NODE_INTERFACE, UnitShape::Unit))
}

/// List the units of all nodes in one call to the controller
///
/// `print` is only invoked once the fetch has fully succeeded.
pub async fn list_units_on_all<B, P>(
    bus: &B,
    print: P,
    glob_filter: Option<&str>,
) -> Result<(), BluechiError>
where
    B: Bus,
    P: FnOnce(&UnitList, Option<&str>),
{
    let unit_list = UnitList::new();
    fetch_unit_list(bus, None, &controller_endpoint(), &unit_list).await?;

    print(&unit_list, glob_filter);
    Ok(())
}

/// List the units of a single node, tagging each with `node_name`
///
/// `print` is only invoked once the fetch has fully succeeded.
pub async fn list_units_on<B, P>(
    bus: &B,
    node_name: &str,
    print: P,
    glob_filter: Option<&str>,
) -> Result<(), BluechiError>
where
    B: Bus,
    P: FnOnce(&UnitList, Option<&str>),
{
    let unit_list = UnitList::new();
    let endpoint = node_endpoint(node_name)?;
    fetch_unit_list(bus, Some(node_name), &endpoint, &unit_list).await?;

    print(&unit_list, glob_filter);
    Ok(())
}

/// List units on `node_name`, or on every node when it is `None`
pub async fn list_units<B, P>(
    bus: &B,
    node_name: Option<&str>,
    print: P,
    glob_filter: Option<&str>,
) -> Result<(), BluechiError>
where
    B: Bus,
    P: FnOnce(&UnitList, Option<&str>),
{
    match node_name {
        None => list_units_on_all(bus, print, glob_filter).await,
        Some(node_name) => list_units_on(bus, node_name, print, glob_filter).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{
        MockBus, broken_value, controller_reply, node_reply, node_unit_value, unit_value,
    };
    use crate::formatting::format_unit_list;
    use bluechi_rs::UnitInfo;
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    /// Print function double that keeps weak references to what it saw
    #[derive(Default)]
    struct Capture {
        called: Cell<bool>,
        filter: RefCell<Option<String>>,
        units: RefCell<Vec<Weak<UnitInfo>>>,
        snapshot: RefCell<Vec<UnitInfo>>,
    }

    impl Capture {
        fn print(&self) -> impl FnOnce(&UnitList, Option<&str>) + '_ {
            move |list, filter| {
                self.called.set(true);
                *self.filter.borrow_mut() = filter.map(str::to_string);
                for unit in list.units().iter() {
                    self.units.borrow_mut().push(Rc::downgrade(unit));
                    self.snapshot.borrow_mut().push(unit.as_ref().clone());
                }
            }
        }

        fn all_released(&self) -> bool {
            self.units.borrow().iter().all(|w| w.upgrade().is_none())
        }
    }

    #[tokio::test]
    async fn test_list_on_all_keeps_wire_nodes() {
        let bus = MockBus::default().reply(
            "/org/eclipse/bluechi",
            "org.eclipse.bluechi.Controller",
            controller_reply(vec![
                node_unit_value("node-a", "a.service", "active", "running"),
                node_unit_value("node-b", "b.service", "failed", "failed"),
            ]),
        );
        let capture = Capture::default();

        list_units_on_all(&bus, capture.print(), Some("*.service"))
            .await
            .unwrap();

        assert!(capture.called.get());
        assert_eq!(capture.filter.borrow().as_deref(), Some("*.service"));
        let snapshot = capture.snapshot.borrow();
        let nodes: Vec<&str> = snapshot.iter().map(|u| u.node_name()).collect();
        assert_eq!(nodes, vec!["node-a", "node-b"]);
        assert!(capture.all_released());
    }

    #[tokio::test]
    async fn test_list_on_node_tags_units() {
        let bus = MockBus::default().reply(
            "/org/eclipse/bluechi/node/laptop",
            "org.eclipse.bluechi.Node",
            node_reply(vec![
                unit_value("a.service", "active", "running"),
                unit_value("b.timer", "active", "waiting"),
                unit_value("c.socket", "inactive", "dead"),
            ]),
        );
        let capture = Capture::default();

        list_units_on(&bus, "laptop", capture.print(), None)
            .await
            .unwrap();

        let snapshot = capture.snapshot.borrow();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|u| u.node.as_deref() == Some("laptop")));
        assert!(capture.all_released());
    }

    #[tokio::test]
    async fn test_list_on_node_escapes_path() {
        let bus = MockBus::default().reply(
            "/org/eclipse/bluechi/node/edge_2d01",
            "org.eclipse.bluechi.Node",
            node_reply(vec![unit_value("a.service", "active", "running")]),
        );
        let capture = Capture::default();

        list_units_on(&bus, "edge-01", capture.print(), None)
            .await
            .unwrap();

        assert_eq!(bus.calls.borrow()[0].1, "/org/eclipse/bluechi/node/edge_2d01");
        assert_eq!(capture.snapshot.borrow()[0].node_name(), "edge-01");
    }

    #[tokio::test]
    async fn test_transport_error_skips_print() {
        let bus = MockBus::default().fail(
            "/org/eclipse/bluechi",
            "org.eclipse.bluechi.Controller",
            "The name is not activatable",
        );
        let capture = Capture::default();

        let err = list_units_on_all(&bus, capture.print(), None)
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(!capture.called.get());
    }

    #[tokio::test]
    async fn test_decode_error_skips_print() {
        let bus = MockBus::default().reply(
            "/org/eclipse/bluechi/node/laptop",
            "org.eclipse.bluechi.Node",
            node_reply(vec![
                unit_value("a.service", "active", "running"),
                unit_value("b.service", "active", "running"),
                broken_value(),
                unit_value("d.service", "active", "running"),
                unit_value("e.service", "active", "running"),
            ]),
        );
        let capture = Capture::default();

        let err = list_units_on(&bus, "laptop", capture.print(), None)
            .await
            .unwrap_err();

        assert!(err.is_protocol());
        assert!(!capture.called.get());
    }

    #[test]
    fn test_endpoints() {
        let endpoint = controller_endpoint();
        assert_eq!(endpoint.object_path, "/org/eclipse/bluechi");
        assert_eq!(endpoint.interface, "org.eclipse.bluechi.Controller");
        assert_eq!(endpoint.shape, UnitShape::NodeAndUnit);

        let endpoint = node_endpoint("laptop").unwrap();
        assert_eq!(endpoint.object_path, "/org/eclipse/bluechi/node/laptop");
        assert_eq!(endpoint.interface, "org.eclipse.bluechi.Node");
        assert_eq!(endpoint.shape, UnitShape::Unit);

        // Any node name can be encoded, including an empty one
        assert_eq!(node_endpoint("").unwrap().object_path, "/org/eclipse/bluechi/node/_");
    }

    #[tokio::test]
    async fn test_list_units_dispatch() {
        let bus = MockBus::default()
            .reply(
                "/org/eclipse/bluechi",
                "org.eclipse.bluechi.Controller",
                controller_reply(vec![]),
            )
            .reply(
                "/org/eclipse/bluechi/node/laptop",
                "org.eclipse.bluechi.Node",
                node_reply(vec![]),
            );

        list_units(&bus, None, |_, _| {}, None).await.unwrap();
        list_units(&bus, Some("laptop"), |_, _| {}, None)
            .await
            .unwrap();

        let calls = bus.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].2, "org.eclipse.bluechi.Controller");
        assert_eq!(calls[1].2, "org.eclipse.bluechi.Node");
    }

    #[tokio::test]
    async fn test_rendered_output_for_empty_node() {
        let bus = MockBus::default().reply(
            "/org/eclipse/bluechi/node/laptop",
            "org.eclipse.bluechi.Node",
            node_reply(vec![]),
        );
        let output = RefCell::new(String::new());

        list_units_on(
            &bus,
            "laptop",
            |list, filter| *output.borrow_mut() = format_unit_list(list, filter),
            None,
        )
        .await
        .unwrap();

        assert_eq!(
            output.into_inner(),
            "NODE | ID | ACTIVE | SUB\n========================\n"
        );
    }
}
