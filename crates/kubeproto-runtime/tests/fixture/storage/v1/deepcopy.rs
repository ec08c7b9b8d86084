// Code generated by kubeproto. DO NOT EDIT.

use super::types::*;
use kubeproto_runtime::DeepCopy;

impl DeepCopy for Bucket {
    fn deep_copy_into(&self, out: &mut Self) {
        out.type_meta.clone_from(&self.type_meta);
        self.metadata.deep_copy_into(&mut out.metadata);
        self.spec.deep_copy_into(&mut out.spec);
        out.status = self.status.as_ref().map(DeepCopy::deep_copy);
    }
}

impl DeepCopy for BucketList {
    fn deep_copy_into(&self, out: &mut Self) {
        out.type_meta.clone_from(&self.type_meta);
        self.metadata.deep_copy_into(&mut out.metadata);
        out.items = self.items.iter().map(DeepCopy::deep_copy).collect();
    }
}

impl DeepCopy for BucketSpec {
    fn deep_copy_into(&self, out: &mut Self) {
        out.strings = self.strings.clone();
        out.messages = self.messages.iter().map(DeepCopy::deep_copy).collect();
        out.storage_class.clone_from(&self.storage_class);
        out.quotas = self.quotas.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect();
        out.retention = self.retention.as_ref().map(DeepCopy::deep_copy);
        out.replicas = self.replicas;
    }
}

impl DeepCopy for BucketStatus {
    fn deep_copy_into(&self, out: &mut Self) {
        out.ready_replicas = self.ready_replicas;
        out.last_sync.clone_from(&self.last_sync);
    }
}

impl DeepCopy for Grant {
    fn deep_copy_into(&self, out: &mut Self) {
        out.name.clone_from(&self.name);
        out.verbs = self.verbs.clone();
    }
}

impl DeepCopy for Quota {
    fn deep_copy_into(&self, out: &mut Self) {
        out.max_bytes = self.max_bytes;
    }
}

impl DeepCopy for Tenant {
    fn deep_copy_into(&self, out: &mut Self) {
        out.type_meta.clone_from(&self.type_meta);
        self.metadata.deep_copy_into(&mut out.metadata);
        out.owner.clone_from(&self.owner);
    }
}

impl DeepCopy for TenantList {
    fn deep_copy_into(&self, out: &mut Self) {
        out.type_meta.clone_from(&self.type_meta);
        self.metadata.deep_copy_into(&mut out.metadata);
        out.items = self.items.iter().map(DeepCopy::deep_copy).collect();
    }
}
