use std::io;

use epaxos::conf::ConfError;
use epaxos::replica::ReplicaError;

quick_error! {
    /// OrdoError is an error that stops a local cluster from running.
    #[derive(Debug)]
    pub enum OrdoError {
        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
            display("cluster conf: {}", e)
        }

        Replica(e: ReplicaError) {
            from(e: ReplicaError) -> (e)
            display("replica: {}", e)
        }

        IO(e: io::Error) {
            from(e: io::Error) -> (e)
            display("io: {}", e)
        }

        NoKey {
            display("at least one key is required")
        }

        Timeout(want: usize) {
            display("not all of {} commands are executed on every replica", want)
        }

        Diverged(key: String) {
            display("replicas executed commands on key {:?} in different orders", key)
        }
    }
}
