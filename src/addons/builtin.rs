use super::{Addon, AddonAsset};

const ADDONS_DIR: &str = "/etc/kubernetes/addons";
const MANIFESTS_DIR: &str = "/etc/kubernetes/manifests";

// Manifests are read from deploy/addons/<addon>/ and land flat in the VM's addons directory.
fn manifests(addon: &str, files: &[&str]) -> Vec<AddonAsset> {
    files
        .iter()
        .map(|file| {
            AddonAsset::new(
                &format!("deploy/addons/{}/{}", addon, file),
                ADDONS_DIR,
                file,
                "0640",
            )
        })
        .collect()
}

pub(super) fn addons() -> Vec<Addon> {
    vec![
        Addon::new(
            "addon-manager",
            vec![AddonAsset::new(
                "deploy/addons/addon-manager.yaml",
                MANIFESTS_DIR,
                "addon-manager.yaml",
                "0640",
            )],
        ),
        Addon::new(
            "dashboard",
            manifests("dashboard", &["dashboard-rc.yaml", "dashboard-svc.yaml"]),
        ),
        Addon::new(
            "default-storageclass",
            manifests("storageclass", &["storageclass.yaml"]),
        ),
        Addon::new(
            "storage-provisioner",
            manifests("storage-provisioner", &["storage-provisioner.yaml"]),
        ),
        Addon::new(
            "kube-dns",
            manifests(
                "kube-dns",
                &[
                    "kube-dns-controller.yaml",
                    "kube-dns-cm.yaml",
                    "kube-dns-svc.yaml",
                ],
            ),
        ),
        Addon::new(
            "heapster",
            manifests(
                "heapster",
                &[
                    "influxGrafana-rc.yaml",
                    "grafana-svc.yaml",
                    "influxdb-svc.yaml",
                    "heapster-rc.yaml",
                    "heapster-svc.yaml",
                ],
            ),
        ),
        Addon::new(
            "ingress",
            manifests(
                "ingress",
                &[
                    "ingress-configmap.yaml",
                    "ingress-rc.yaml",
                    "ingress-svc.yaml",
                ],
            ),
        ),
        Addon::new(
            super::REGISTRY_CREDS,
            manifests("registry-creds", &["registry-creds-rc.yaml"]),
        ),
    ]
}
