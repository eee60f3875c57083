//! A scripted resolver for tests. Anything not scripted is NXDOMAIN.
use super::Role;
use crate::{
    config::Config,
    resolver::{Answer, Lookup, Resolve, Status},
};
use std::{cell::RefCell, collections::HashMap, net::Ipv4Addr};

pub(crate) const PROD_SERVER: &str = "10.0.0.1";
pub(crate) const TEST_SERVER: &str = "10.0.0.2";

pub(crate) fn config() -> Config {
    Config {
        prod_server: PROD_SERVER.to_owned(),
        test_server: TEST_SERVER.to_owned(),
        default_domain: ".example.com".to_owned(),
        ..Config::default()
    }
}

fn server(role: Role) -> String {
    match role {
        Role::Test => TEST_SERVER.to_owned(),
        Role::Prod => PROD_SERVER.to_owned(),
    }
}

/// An answer as a typical server returns it: A for dotted quads, else CNAME.
pub(crate) fn answer(name: &str, data: &str) -> Answer {
    let is_ip = data.parse::<Ipv4Addr>().is_ok();
    Answer {
        name: name.to_owned(),
        data: data.to_owned(),
        typename: if is_ip { "A" } else { "CNAME" }.to_owned(),
        classstr: "IN".to_owned(),
        ttl: 360,
        rtype: if is_ip { 1 } else { 5 },
        class: 1,
        rdlength: if is_ip { 4 } else { data.len() as u16 + 2 },
    }
}

#[derive(Debug, Default)]
pub(crate) struct StubResolver {
    forward: HashMap<(String, String), Lookup>,
    reverse: HashMap<(String, Ipv4Addr), Lookup>,
    queries: RefCell<Vec<String>>,
}

impl StubResolver {
    pub(crate) fn lookup(mut self, role: Role, name: &str, lookup: Lookup) -> Self {
        self.forward.insert((server(role), name.to_owned()), lookup);
        self
    }

    pub(crate) fn answer(self, role: Role, name: &str, data: &str) -> Self {
        self.lookup(role, name, Lookup::Answer(answer(name, data)))
    }

    pub(crate) fn status(self, role: Role, name: &str, status: Status) -> Self {
        self.lookup(role, name, Lookup::Status(status))
    }

    pub(crate) fn ptr(mut self, role: Role, ip: &str, target: &str) -> Self {
        let ip: Ipv4Addr = ip.parse().unwrap();
        let mut ptr = answer(&crate::resolver::ptr_name(ip), target);
        ptr.typename = "PTR".to_owned();
        ptr.rtype = 12;
        self.reverse.insert((server(role), ip), Lookup::Answer(ptr));
        self
    }

    pub(crate) fn ptr_status(mut self, role: Role, ip: &str, status: Status) -> Self {
        let ip: Ipv4Addr = ip.parse().unwrap();
        self.reverse
            .insert((server(role), ip), Lookup::Status(status));
        self
    }

    /// Every query so far, as `SERVER NAME` or `SERVER PTR IP`.
    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// Whether any query went to the server with this role.
    pub(crate) fn asked(&self, role: Role) -> bool {
        let server = server(role);
        self.queries
            .borrow()
            .iter()
            .any(|q| q.split(' ').next() == Some(server.as_str()))
    }
}

impl Resolve for StubResolver {
    fn resolve(&self, name: &str, server: &str) -> Lookup {
        self.queries.borrow_mut().push(format!("{server} {name}"));
        self.forward
            .get(&(server.to_owned(), name.to_owned()))
            .cloned()
            .unwrap_or(Lookup::Status(Status::NxDomain))
    }

    fn reverse_lookup(&self, ip: Ipv4Addr, server: &str) -> Lookup {
        self.queries.borrow_mut().push(format!("{server} PTR {ip}"));
        self.reverse
            .get(&(server.to_owned(), ip))
            .cloned()
            .unwrap_or(Lookup::Status(Status::NxDomain))
    }
}
