use super::normalize;

/// Sizes that support accelerated networking on Linux.
const ACCELERATED_NETWORKING_SKUS: &[&str] = &[
    "standard_d2_v2",
    "standard_d3_v2",
    "standard_d4_v2",
    "standard_d5_v2",
    "standard_d11_v2",
    "standard_d12_v2",
    "standard_d13_v2",
    "standard_d14_v2",
    "standard_d15_v2",
    "standard_ds2_v2",
    "standard_ds3_v2",
    "standard_ds4_v2",
    "standard_ds5_v2",
    "standard_ds11_v2",
    "standard_ds12_v2",
    "standard_ds13_v2",
    "standard_ds14_v2",
    "standard_ds15_v2",
    "standard_d4_v3",
    "standard_d8_v3",
    "standard_d16_v3",
    "standard_d32_v3",
    "standard_d64_v3",
    "standard_d4s_v3",
    "standard_d8s_v3",
    "standard_d16s_v3",
    "standard_d32s_v3",
    "standard_d64s_v3",
    "standard_d2s_v4",
    "standard_d4s_v4",
    "standard_d8s_v4",
    "standard_d16s_v4",
    "standard_d32s_v4",
    "standard_d2ds_v5",
    "standard_d4ds_v5",
    "standard_d8ds_v5",
    "standard_d16ds_v5",
    "standard_d2s_v5",
    "standard_d4s_v5",
    "standard_d8s_v5",
    "standard_d16s_v5",
    "standard_e4_v3",
    "standard_e8_v3",
    "standard_e16_v3",
    "standard_e32_v3",
    "standard_e64_v3",
    "standard_e4s_v3",
    "standard_e8s_v3",
    "standard_e16s_v3",
    "standard_e32s_v3",
    "standard_e64s_v3",
    "standard_f2",
    "standard_f4",
    "standard_f8",
    "standard_f16",
    "standard_f2s",
    "standard_f4s",
    "standard_f8s",
    "standard_f16s",
    "standard_f4s_v2",
    "standard_f8s_v2",
    "standard_f16s_v2",
    "standard_f32s_v2",
    "standard_f64s_v2",
    "standard_f72s_v2",
    "standard_m64s",
    "standard_m64ms",
    "standard_m128s",
    "standard_m128ms",
    "standard_nc6s_v3",
    "standard_nc12s_v3",
    "standard_nc24s_v3",
    "standard_nc4as_t4_v3",
    "standard_nc8as_t4_v3",
    "standard_nc16as_t4_v3",
    "standard_nc64as_t4_v3",
];

pub fn accelerated_networking_supported(sku: &str) -> bool {
    let sku = normalize(sku);
    ACCELERATED_NETWORKING_SKUS.contains(&sku.as_str())
}
