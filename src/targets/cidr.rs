// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::str::FromStr;

use crate::errors::TargetError;

/// Largest block we are willing to enumerate
const MAX_HOST_BITS: u32 = 20;

/// Expand a CIDR block into its usable host addresses.
///
/// IPv4 blocks up to /30 drop the network and broadcast addresses; /31 and
/// /32 keep every address. IPv6 blocks drop the subnet-router anycast
/// address except for /127 and /128. A bare address is treated as a single
/// host.
pub fn expand(subnet: &str) -> Result<Vec<IpAddr>, TargetError> {
    let network = IpNetwork::from_str(subnet.trim()).map_err(|e| TargetError::InvalidSubnet {
        subnet: subnet.to_string(),
        reason: e.to_string(),
    })?;

    let host_bits = match network {
        IpNetwork::V4(net) => 32 - u32::from(net.prefix()),
        IpNetwork::V6(net) => 128 - u32::from(net.prefix()),
    };
    if host_bits > MAX_HOST_BITS {
        return Err(TargetError::InvalidSubnet {
            subnet: subnet.to_string(),
            reason: format!("block too large (/{})", network.prefix()),
        });
    }

    let hosts: Vec<IpAddr> = match network {
        IpNetwork::V4(net) if net.prefix() <= 30 => net
            .iter()
            .filter(|ip| *ip != net.network() && *ip != net.broadcast())
            .map(IpAddr::V4)
            .collect(),
        IpNetwork::V4(net) => net.iter().map(IpAddr::V4).collect(),
        IpNetwork::V6(net) if net.prefix() <= 126 => net
            .iter()
            .filter(|ip| *ip != net.network())
            .map(IpAddr::V6)
            .collect(),
        IpNetwork::V6(net) => net.iter().map(IpAddr::V6).collect(),
    };

    Ok(hosts)
}
