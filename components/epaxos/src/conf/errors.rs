use crate::qpaxos::ReplicaId;

quick_error! {
    #[derive(Debug)]
    pub enum ConfError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
        }

        NoReplica {
            display("cluster has no replica")
        }

        UnknownReplica(rid: ReplicaId) {
            display("replica {} is not in cluster", rid)
        }

        BadQuorumTimeout {
            display("quorum_timeout_ms must be greater than 0")
        }
    }
}

impl PartialEq<ConfError> for ConfError {
    fn eq(&self, other: &ConfError) -> bool {
        match (self, other) {
            (Self::IOError(a), Self::IOError(b)) => a.kind() == b.kind(),
            (Self::BadYaml(_), Self::BadYaml(_)) => true,
            (Self::NoReplica, Self::NoReplica) => true,
            (Self::UnknownReplica(a), Self::UnknownReplica(b)) => a == b,
            (Self::BadQuorumTimeout, Self::BadQuorumTimeout) => true,
            _ => false,
        }
    }
}
