use crate::conf::ConfError;
use crate::qpaxos::ReplicaId;

quick_error! {
    #[derive(Debug)]
    pub enum ReplicaError {
        ReplicaNotFound(rid: ReplicaId) {
            display("replica {:?} not found in cluster", rid)
        }

        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
        }
    }
}
