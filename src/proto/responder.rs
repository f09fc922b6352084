//! The authoritative record table.
//!
//! The responder holds every record this host advertises, indexed by record
//! type, and answers incoming questions from it. It keeps no per-query state:
//! answering is a pure function of the table and the question.

use std::collections::HashMap;

use crate::message::{DnsType, Packet, Record, RecordData, dns_equal, matches_question};

use super::Response;

/// Authoritative store of locally-advertised records.
#[derive(Debug, Default)]
pub struct Responder {
    table: HashMap<DnsType, Vec<Record>>,
}

impl Responder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records to the table.
    ///
    /// Idempotent: a record duplicating an existing entry under
    /// `(type, name, data)` is dropped silently.
    pub fn register<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            let bucket = self.table.entry(record.rtype()).or_default();
            let duplicate = bucket
                .iter()
                .any(|existing| dns_equal(&existing.name, &record.name) && existing.data == record.data);
            if duplicate {
                log::trace!("Skipping duplicate record {record}");
                continue;
            }
            bucket.push(record);
        }
    }

    /// Remove records from the table by `(type, name)` equality.
    ///
    /// Absent records are a no-op.
    pub fn unregister<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            if let Some(bucket) = self.table.get_mut(&record.rtype()) {
                bucket.retain(|existing| !dns_equal(&existing.name, &record.name));
            }
        }
    }

    /// Total number of records currently registered.
    pub fn record_count(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Answer every question of an incoming query.
    ///
    /// Returns one response per question with at least one matching answer;
    /// questions without answers produce nothing. `ANY` questions answer with
    /// every matching record across all types and carry no additionals; typed
    /// questions get the PTR → SRV/TXT → A/AAAA additionals chain.
    pub fn handle_query(&self, packet: &Packet) -> Vec<Response> {
        let mut responses = Vec::new();

        for question in &packet.questions {
            let answers: Vec<Record> = match question.typ {
                DnsType::Any => self
                    .table
                    .values()
                    .flatten()
                    .filter(|record| matches_question(&question.name, &record.name))
                    .cloned()
                    .collect(),
                typ => self
                    .table
                    .get(&typ)
                    .map(|bucket| {
                        bucket
                            .iter()
                            .filter(|record| matches_question(&question.name, &record.name))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default(),
            };

            if answers.is_empty() {
                continue;
            }

            let additionals = if question.typ == DnsType::Any {
                Vec::new()
            } else {
                self.additionals_for(&answers)
            };

            log::trace!(
                "Answering {} with {} answers, {} additionals",
                question,
                answers.len(),
                additionals.len()
            );
            responses.push(Response {
                answers,
                additionals,
            });
        }

        responses
    }

    // For each PTR answer, append every SRV and TXT at the PTR target, then
    // for every appended SRV the A/AAAA records of its target host. Clients
    // are expected to cope with duplicates, so none are removed here.
    fn additionals_for(&self, answers: &[Record]) -> Vec<Record> {
        let mut additionals = Vec::new();

        for answer in answers {
            let RecordData::Ptr(target) = &answer.data else {
                continue;
            };
            for typ in [DnsType::Srv, DnsType::Txt] {
                if let Some(bucket) = self.table.get(&typ) {
                    additionals.extend(
                        bucket
                            .iter()
                            .filter(|record| dns_equal(&record.name, target))
                            .cloned(),
                    );
                }
            }
        }

        let srv_targets: Vec<String> = additionals
            .iter()
            .filter_map(|record| match &record.data {
                RecordData::Srv(srv) => Some(srv.target.clone()),
                _ => None,
            })
            .collect();

        for target in srv_targets {
            for typ in [DnsType::A, DnsType::Aaaa] {
                if let Some(bucket) = self.table.get(&typ) {
                    additionals.extend(
                        bucket
                            .iter()
                            .filter(|record| dns_equal(&record.name, &target))
                            .cloned(),
                    );
                }
            }
        }

        additionals
    }
}
