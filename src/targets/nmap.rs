// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reader for Nmap XML reports (`nmap -oX`).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use crate::errors::TargetError;

/// One scanned host and its open ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmapHost {
    pub address: String,
    pub open_ports: Vec<u16>,
}

pub fn parse_file(path: &Path) -> Result<Vec<NmapHost>, TargetError> {
    let content = std::fs::read_to_string(path).map_err(|e| TargetError::NmapReport {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_str(&content).map_err(|reason| TargetError::NmapReport {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn parse_str(xml: &str) -> Result<Vec<NmapHost>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut hosts = Vec::new();
    let mut seen_root = false;
    let mut depth: usize = 0;

    let mut in_host = false;
    let mut address: Option<String> = None;
    let mut open_ports: Vec<u16> = Vec::new();
    let mut current_port: Option<u16> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                if is_start {
                    depth += 1;
                }

                match e.name().as_ref() {
                    b"nmaprun" => seen_root = true,
                    b"host" => {
                        in_host = is_start;
                        address = None;
                        open_ports.clear();
                        current_port = None;
                    }
                    b"address" if in_host && address.is_none() => {
                        let addrtype = attribute(e, "addrtype")?;
                        if matches!(addrtype.as_deref(), Some("ipv4") | Some("ipv6")) {
                            address = attribute(e, "addr")?;
                        }
                    }
                    b"port" if in_host && is_start => {
                        current_port = match attribute(e, "portid")? {
                            Some(id) => Some(
                                id.parse()
                                    .map_err(|_| format!("invalid portid '{}'", id))?,
                            ),
                            None => None,
                        };
                    }
                    b"state" => {
                        if let Some(port) = current_port {
                            if attribute(e, "state")?.as_deref() == Some("open") {
                                open_ports.push(port);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"port" => current_port = None,
                    b"host" => {
                        if let Some(addr) = address.take() {
                            hosts.push(NmapHost {
                                address: addr,
                                open_ports: std::mem::take(&mut open_ports),
                            });
                        }
                        in_host = false;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err("truncated document".to_string());
    }
    if !seen_root {
        return Err("missing <nmaprun> element".to_string());
    }

    Ok(hosts)
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    match element.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|e| e.to_string()),
        Ok(None) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}
