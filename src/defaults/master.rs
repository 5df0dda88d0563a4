use super::Context;
use crate::constants::{network, orchestrator};
use crate::datamodel::ContainerService;
use crate::distro::Distro;
use std::net::Ipv4Addr;

/// Host offset of the first static IP in the last /24 of a subnet.
const STATIC_IP_OFFSET: u8 = 5;
/// Host offset of the first static IP when masters run in a scale set.
const STATIC_IP_OFFSET_VMSS: u8 = 4;

pub(super) fn set_master_profile_defaults(mut cs: ContainerService, ctx: &Context<'_>) -> ContainerService {
    let is_kubernetes = cs.properties.is_kubernetes();
    let Some(master) = cs.properties.master_profile.as_mut() else {
        return cs;
    };

    if master.availability_profile.is_empty() {
        master.availability_profile = orchestrator::AVAILABILITY_SET.to_string();
    }

    if master.is_vmss() && master.single_placement_group.is_none() {
        master.single_placement_group = Some(orchestrator::DEFAULT_SINGLE_PLACEMENT_GROUP);
    }

    if master.is_custom_vnet() && master.is_vmss() && is_kubernetes {
        master.first_consecutive_static_ip = first_consecutive_static_ip(&master.vnet_cidr, true);
    }

    if !is_kubernetes {
        master.distro = Some(Distro::Ubuntu);
        if !master.is_custom_vnet()
            && (!ctx.params.is_upgrade || master.first_consecutive_static_ip.is_empty())
        {
            master.subnet = network::DEFAULT_MASTER_SUBNET.to_string();
            master.first_consecutive_static_ip = network::DEFAULT_FIRST_CONSECUTIVE_STATIC_IP.to_string();
        }
    }

    if master.http_source_address_prefix.is_empty() {
        master.http_source_address_prefix = "*".to_string();
    }

    if master.cosmos_etcd.is_none() {
        master.cosmos_etcd = Some(orchestrator::DEFAULT_USE_COSMOS);
    }

    if master.platform_update_domain_count.is_none() {
        master.platform_update_domain_count = Some(orchestrator::DEFAULT_PLATFORM_UPDATE_DOMAIN_COUNT);
    }

    cs
}

/// First static IP handed to masters inside `subnet`.
///
/// Availability-set masters take the fifth address of the last /24 of the
/// subnet; scale-set masters take the fourth address of the first /24.
/// Falls back to the default static IP when `subnet` is not an IPv4 CIDR.
pub fn first_consecutive_static_ip(subnet: &str, vmss: bool) -> String {
    let Some((ip, prefix)) = parse_ipv4_cidr(subnet) else {
        return network::DEFAULT_FIRST_CONSECUTIVE_STATIC_IP.to_string();
    };
    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    let mut octets = (u32::from(ip) & mask).to_be_bytes();
    if vmss {
        octets[3] = STATIC_IP_OFFSET_VMSS;
    } else {
        // every host bit set except in the last octet
        let host = !mask;
        let base = u32::from_be_bytes(octets) | host;
        octets = base.to_be_bytes();
        octets[3] = STATIC_IP_OFFSET;
    }
    Ipv4Addr::from(octets).to_string()
}

fn parse_ipv4_cidr(cidr: &str) -> Option<(Ipv4Addr, u32)> {
    let (ip, prefix) = cidr.split_once('/')?;
    let ip: Ipv4Addr = ip.parse().ok()?;
    let prefix: u32 = prefix.parse().ok()?;
    (prefix <= 32).then_some((ip, prefix))
}
