//! Lifecycle layer for published services.
//!
//! The registry turns publish options into a descriptor, installs its record
//! set into the responder and produces the unsolicited announcement. On
//! teardown it produces the goodbye (every shared PTR re-sent with TTL zero)
//! and removes the records again.

use crate::error::Result;
use crate::hostinfo::HostInfo;
use crate::message::DnsType;
use crate::service::{ServiceConfig, ServiceInfo};

use super::Response;
use super::responder::Responder;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    services: Vec<ServiceInfo>,
}

impl Registry {
    /// Publish one service: validate, register its records, and return the
    /// descriptor together with the announcement to multicast.
    ///
    /// Records are registered before the announcement is produced, so a query
    /// racing the announcement cannot observe a partial record set.
    pub(crate) fn publish(
        &mut self,
        responder: &mut Responder,
        host_info: &HostInfo,
        config: ServiceConfig,
    ) -> Result<(ServiceInfo, Response)> {
        let mut service = ServiceInfo::new(config, host_info)?;
        let records = service.records();

        responder.register(records.clone());
        service.published = true;
        self.services.push(service.clone());

        log::debug!("Published {service} with {} records", records.len());
        Ok((
            service,
            Response {
                answers: records,
                additionals: Vec::new(),
            },
        ))
    }

    /// Tear down every published service.
    ///
    /// Returns the goodbye response to multicast, or `None` when nothing was
    /// published. The responder's records are unregistered either way.
    pub(crate) fn unpublish_all(&mut self, responder: &mut Responder) -> Option<Response> {
        if self.services.is_empty() {
            return None;
        }

        let mut goodbyes = Vec::new();
        for service in &self.services {
            let records = service.records();
            goodbyes.extend(
                records
                    .iter()
                    .filter(|record| record.rtype() == DnsType::Ptr)
                    .map(|record| record.goodbye()),
            );
            responder.unregister(records);
        }

        log::debug!(
            "Unpublished {} services, {} goodbye records",
            self.services.len(),
            goodbyes.len()
        );
        self.services.clear();

        Some(Response {
            answers: goodbyes,
            additionals: Vec::new(),
        })
    }

    pub(crate) fn services(&self) -> &[ServiceInfo] {
        &self.services
    }
}
