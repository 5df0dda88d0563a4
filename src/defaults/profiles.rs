use super::Context;
use crate::cloud::{AKS_WINDOWS_SERVER_2019_IMAGE, WINDOWS_SERVER_2019_IMAGE};
use crate::constants::{extensions, network, orchestrator, telemetry};
use crate::datamodel::{ContainerService, TelemetryProfile, WindowsProfile};

type PirImage = (&'static str, &'static str, &'static str, &'static str);

pub(super) fn set_extension_defaults(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    for extension in cs.properties.extension_profiles.iter_mut() {
        if extension.root_url.is_empty() {
            extension.root_url = extensions::DEFAULT_ROOT_URL.to_string();
        }
    }
    cs
}

pub(super) fn set_hosted_master_profile_defaults(
    mut cs: ContainerService,
    _ctx: &Context<'_>,
) -> ContainerService {
    if let Some(hosted) = cs.properties.hosted_master_profile.as_mut() {
        if hosted.subnet.is_empty() {
            hosted.subnet = network::DEFAULT_MASTER_SUBNET.to_string();
        }
    }
    cs
}

fn fill_image(profile: &mut WindowsProfile, image: PirImage) {
    let (publisher, offer, sku, version) = image;
    if profile.windows_publisher.is_empty() {
        profile.windows_publisher = publisher.to_string();
    }
    if profile.windows_offer.is_empty() {
        profile.windows_offer = offer.to_string();
    }
    if profile.windows_sku.is_empty() {
        profile.windows_sku = sku.to_string();
    }
    if profile.image_version.is_empty() {
        // A sku we do not publish has no pinned version to offer.
        profile.image_version = if profile.windows_sku == sku {
            version.to_string()
        } else {
            orchestrator::LATEST_IMAGE_VERSION.to_string()
        };
    }
}

/// On upgrade the image family is fixed; only a matching family gets its
/// sku and version refreshed.
fn refresh_image(profile: &mut WindowsProfile, image: PirImage) -> bool {
    let (publisher, offer, sku, version) = image;
    if profile.windows_publisher != publisher || profile.windows_offer != offer {
        return false;
    }
    if profile.windows_sku.is_empty() {
        profile.windows_sku = sku.to_string();
    }
    if profile.image_version.is_empty() && profile.windows_sku == sku {
        profile.image_version = version.to_string();
    }
    true
}

pub(super) fn set_windows_profile_defaults(mut cs: ContainerService, ctx: &Context<'_>) -> ContainerService {
    if !cs.properties.has_windows() {
        return cs;
    }
    let Some(profile) = cs.properties.windows_profile.as_mut() else {
        return cs;
    };

    if ctx.params.is_upgrade {
        if !refresh_image(profile, AKS_WINDOWS_SERVER_2019_IMAGE) {
            refresh_image(profile, WINDOWS_SERVER_2019_IMAGE);
        }
    } else if !ctx.params.is_scale {
        let image = if profile.windows_publisher.is_empty()
            || profile.windows_publisher == AKS_WINDOWS_SERVER_2019_IMAGE.0
        {
            AKS_WINDOWS_SERVER_2019_IMAGE
        } else {
            WINDOWS_SERVER_2019_IMAGE
        };
        fill_image(profile, image);
        if profile.ssh_enabled.is_none() {
            profile.ssh_enabled = Some(orchestrator::DEFAULT_WINDOWS_SSH);
        }
    }
    cs
}

pub(super) fn set_telemetry_profile_defaults(
    mut cs: ContainerService,
    _ctx: &Context<'_>,
) -> ContainerService {
    let profile = cs
        .properties
        .telemetry_profile
        .get_or_insert_with(TelemetryProfile::default);
    if profile.application_insights_key.is_empty() {
        profile.application_insights_key = telemetry::DEFAULT_APPLICATION_INSIGHTS_KEY.to_string();
    }
    cs
}
